use std::collections::{BTreeSet, HashSet};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::calendar::format_date_key;
use crate::locale::{MAX_CANDIDATES, glyph_for, messages};
use crate::timeparse::{parse_time_input, time_key_to_naive, validate_time_input};

/// One proposed date and time in the poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    id: u64,
    #[serde(rename = "date")]
    date_key: String,
    #[serde(rename = "time")]
    time_key: String,
    glyph: &'static str,
    #[serde(skip)]
    at: NaiveDateTime,
}

impl Candidate {
    fn new(id: u64, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            id,
            date_key: format_date_key(date),
            time_key: time.format("%H:%M").to_string(),
            glyph: "",
            at: NaiveDateTime::new(date, time),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn date_key(&self) -> &str {
        &self.date_key
    }

    pub fn time_key(&self) -> &str {
        &self.time_key
    }

    pub fn glyph(&self) -> &'static str {
        self.glyph
    }

    pub fn date(&self) -> NaiveDate {
        self.at.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.at.time()
    }

    /// Local wall-clock instant used for ordering.
    pub fn at(&self) -> NaiveDateTime {
        self.at
    }
}

/// Why a commit left the candidate list untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommitRejection {
    #[error("{}", messages::INCOMPLETE_SELECTION)]
    Incomplete,
    #[error("{}", messages::INVALID_TIME)]
    InvalidTime,
    #[error("{}", messages::DUPLICATE)]
    Duplicate,
    #[error("候補日は最大{max}個までです（現在{current}個、追加可能{remaining}個）", max = MAX_CANDIDATES)]
    CapacityExceeded { current: usize, remaining: usize },
}

/// Reassigns every glyph from list position.
pub fn relabel(candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(position, candidate)| Candidate {
            glyph: glyph_for(position),
            ..candidate
        })
        .collect()
}

/// Chronologically sorted, glyph-labelled candidates.
#[derive(Debug, Clone)]
pub struct CandidateList {
    items: Vec<Candidate>,
    next_id: u64,
}

impl Default for CandidateList {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
        }
    }
}

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.items
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining_capacity(&self) -> usize {
        MAX_CANDIDATES.saturating_sub(self.items.len())
    }

    /// Adds one candidate per selected date at `time`, skipping pairs already
    /// present. Returns how many were added.
    #[instrument(skip(self, dates), fields(dates = dates.len(), existing = self.items.len()))]
    pub fn commit(&mut self, dates: &BTreeSet<NaiveDate>, time: &str) -> Result<usize, CommitRejection> {
        if dates.is_empty() || time.trim().is_empty() {
            return Err(CommitRejection::Incomplete);
        }
        if !validate_time_input(time) {
            return Err(CommitRejection::InvalidTime);
        }
        let time_key = parse_time_input(time);
        let time = time_key_to_naive(&time_key).ok_or(CommitRejection::InvalidTime)?;

        let existing: HashSet<NaiveDateTime> = self.items.iter().map(Candidate::at).collect();
        let fresh: Vec<NaiveDate> = dates
            .iter()
            .copied()
            .filter(|date| !existing.contains(&NaiveDateTime::new(*date, time)))
            .collect();

        if fresh.is_empty() {
            debug!(time = %time_key, "every selected pair already present");
            return Err(CommitRejection::Duplicate);
        }

        if self.items.len() + fresh.len() > MAX_CANDIDATES {
            return Err(CommitRejection::CapacityExceeded {
                current: self.items.len(),
                remaining: self.remaining_capacity(),
            });
        }

        let added = fresh.len();
        let mut merged = std::mem::take(&mut self.items);
        for date in fresh {
            merged.push(Candidate::new(self.next_id, date, time));
            self.next_id += 1;
        }
        merged.sort_by_key(Candidate::at);
        self.items = relabel(merged);

        info!(added, total = self.items.len(), time = %time_key, "candidates committed");
        Ok(added)
    }

    /// Drops the candidate with `id`; absent ids are ignored.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.items.len();
        let kept: Vec<Candidate> = std::mem::take(&mut self.items)
            .into_iter()
            .filter(|c| c.id != id)
            .collect();
        self.items = relabel(kept);

        let removed = self.items.len() != before;
        debug!(id, removed, "candidate removal");
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn dates(keys: &[(i32, u32, u32)]) -> BTreeSet<NaiveDate> {
        keys.iter().map(|&(y, m, d)| date(y, m, d)).collect()
    }

    fn summary(list: &CandidateList) -> Vec<(String, String, &'static str)> {
        list.iter()
            .map(|c| (c.date_key().to_string(), c.time_key().to_string(), c.glyph()))
            .collect()
    }

    #[test]
    fn merges_two_dates_into_empty_list() {
        let mut list = CandidateList::new();
        let added = list
            .commit(&dates(&[(2025, 6, 2), (2025, 6, 1)]), "10:00")
            .expect("commit");

        assert_eq!(added, 2);
        assert_eq!(
            summary(&list),
            vec![
                ("2025-06-01".to_string(), "10:00".to_string(), "1️⃣"),
                ("2025-06-02".to_string(), "10:00".to_string(), "2️⃣"),
            ]
        );
    }

    #[test]
    fn normalizes_time_before_storing() {
        let mut list = CandidateList::new();
        list.commit(&dates(&[(2025, 6, 1)]), "930").expect("commit");
        assert_eq!(list.as_slice()[0].time_key(), "09:30");

        // "09:30" and "930" are the same pair.
        assert_eq!(
            list.commit(&dates(&[(2025, 6, 1)]), "9:30"),
            Err(CommitRejection::Duplicate)
        );
    }

    #[test]
    fn sorts_across_commits_and_relabels() {
        let mut list = CandidateList::new();
        list.commit(&dates(&[(2025, 6, 3)]), "09:00").expect("first");
        list.commit(&dates(&[(2025, 6, 1), (2025, 6, 3)]), "18:00").expect("second");
        list.commit(&dates(&[(2025, 6, 3)]), "0800").expect("third");

        assert_eq!(
            summary(&list),
            vec![
                ("2025-06-01".to_string(), "18:00".to_string(), "1️⃣"),
                ("2025-06-03".to_string(), "08:00".to_string(), "2️⃣"),
                ("2025-06-03".to_string(), "09:00".to_string(), "3️⃣"),
                ("2025-06-03".to_string(), "18:00".to_string(), "4️⃣"),
            ]
        );
    }

    #[test]
    fn duplicate_submission_is_idempotent() {
        let mut list = CandidateList::new();
        let selected = dates(&[(2025, 6, 1)]);
        list.commit(&selected, "10:00").expect("commit");
        let before = list.as_slice().to_vec();

        assert_eq!(list.commit(&selected, "10:00"), Err(CommitRejection::Duplicate));
        assert_eq!(list.as_slice(), before.as_slice());
    }

    #[test]
    fn partially_duplicate_selection_adds_only_new_dates() {
        let mut list = CandidateList::new();
        list.commit(&dates(&[(2025, 6, 1)]), "10:00").expect("commit");
        let added = list
            .commit(&dates(&[(2025, 6, 1), (2025, 6, 2)]), "10:00")
            .expect("commit");
        assert_eq!(added, 1);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn rejects_incomplete_and_invalid_input() {
        let mut list = CandidateList::new();
        assert_eq!(list.commit(&BTreeSet::new(), "10:00"), Err(CommitRejection::Incomplete));
        assert_eq!(list.commit(&dates(&[(2025, 6, 1)]), ""), Err(CommitRejection::Incomplete));
        assert_eq!(list.commit(&dates(&[(2025, 6, 1)]), "  "), Err(CommitRejection::Incomplete));
        assert_eq!(list.commit(&dates(&[(2025, 6, 1)]), "2560"), Err(CommitRejection::InvalidTime));
        assert!(list.is_empty());
    }

    #[test]
    fn capacity_is_enforced_without_changes() {
        let mut list = CandidateList::new();
        let nine: BTreeSet<NaiveDate> = (1..=9).map(|d| date(2025, 6, d)).collect();
        list.commit(&nine, "10:00").expect("nine fit");
        let before = list.as_slice().to_vec();

        let rejection = list
            .commit(&dates(&[(2025, 6, 20), (2025, 6, 21)]), "10:00")
            .expect_err("eleven do not fit");
        assert_eq!(
            rejection,
            CommitRejection::CapacityExceeded {
                current: 9,
                remaining: 1
            }
        );
        assert_eq!(
            rejection.to_string(),
            "候補日は最大10個までです（現在9個、追加可能1個）"
        );
        assert_eq!(list.as_slice(), before.as_slice());

        list.commit(&dates(&[(2025, 6, 20)]), "10:00").expect("tenth fits");
        assert_eq!(list.as_slice()[9].glyph(), "🔟");
        assert_eq!(list.remaining_capacity(), 0);
    }

    #[test]
    fn removal_relabels_and_keeps_order() {
        let mut list = CandidateList::new();
        list.commit(&dates(&[(2025, 6, 1), (2025, 6, 2), (2025, 6, 3)]), "10:00")
            .expect("commit");
        let middle = list.as_slice()[1].id();

        assert!(list.remove(middle));
        assert_eq!(
            summary(&list),
            vec![
                ("2025-06-01".to_string(), "10:00".to_string(), "1️⃣"),
                ("2025-06-03".to_string(), "10:00".to_string(), "2️⃣"),
            ]
        );
        assert!(!list.remove(middle));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn ids_are_never_reused() {
        let mut list = CandidateList::new();
        list.commit(&dates(&[(2025, 6, 1)]), "10:00").expect("commit");
        let first = list.as_slice()[0].id();
        list.remove(first);
        list.commit(&dates(&[(2025, 6, 1)]), "10:00").expect("commit");
        assert_ne!(list.as_slice()[0].id(), first);
    }

    #[test]
    fn serializes_keys_and_glyph() {
        let mut list = CandidateList::new();
        list.commit(&dates(&[(2025, 6, 1)]), "1430").expect("commit");
        let json = serde_json::to_value(list.as_slice()).expect("serialize");
        assert_eq!(json[0]["date"], "2025-06-01");
        assert_eq!(json[0]["time"], "14:30");
        assert_eq!(json[0]["glyph"], "1️⃣");
        assert!(json[0].get("at").is_none());
    }
}
