//! Session state for composing one poll.
//!
//! The composer owns everything a user edits during a session and turns
//! user actions into calls on the calendar, time parser, merger and
//! formatter. Failures never escape as errors: they become notifications.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::{NaiveDate, Weekday};
use tracing::{debug, info, warn};

use crate::calendar::{CalendarDay, generate_window};
use crate::candidate::{CandidateList, CommitRejection};
use crate::clipboard::ClipboardSink;
use crate::clock::Clock;
use crate::locale::{PERIODS, Period, messages};
use crate::notify::{DEFAULT_TTL, Notification, Notifier, Severity};
use crate::preview::render_preview;
use crate::timeparse::{parse_time_input, validate_time_input};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposerSettings {
    pub week_start: Weekday,
    pub notification_ttl: Duration,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            week_start: Weekday::Sun,
            notification_ttl: DEFAULT_TTL,
        }
    }
}

/// Dates and time chosen but not yet committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub dates: BTreeSet<NaiveDate>,
    pub time: String,
    pub time_valid: bool,
}

impl Default for PendingSelection {
    fn default() -> Self {
        Self {
            dates: BTreeSet::new(),
            time: String::new(),
            time_valid: true,
        }
    }
}

impl PendingSelection {
    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug)]
pub struct Composer {
    settings: ComposerSettings,
    clock: Box<dyn Clock>,
    description: String,
    include_none_option: bool,
    pending: PendingSelection,
    candidates: CandidateList,
    notifier: Notifier,
}

impl Composer {
    pub fn new(settings: ComposerSettings, clock: Box<dyn Clock>) -> Self {
        Self {
            settings,
            clock,
            description: String::new(),
            include_none_option: false,
            pending: PendingSelection::default(),
            candidates: CandidateList::new(),
            notifier: Notifier::new(settings.notification_ttl),
        }
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn include_none_option(&self) -> bool {
        self.include_none_option
    }

    pub fn set_include_none_option(&mut self, include: bool) {
        self.include_none_option = include;
    }

    pub fn pending(&self) -> &PendingSelection {
        &self.pending
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    /// A fresh window from the clock.
    pub fn calendar(&self) -> Vec<CalendarDay> {
        generate_window(self.clock.today(), self.settings.week_start)
    }

    /// Adds or removes a window date from the pending set. Returns whether
    /// the date is selected afterwards.
    pub fn toggle_date(&mut self, date: NaiveDate) -> bool {
        let window = self.calendar();
        let Some(day) = window.iter().find(|day| day.date == date) else {
            self.notify(Severity::Warning, messages::OUTSIDE_WINDOW);
            return false;
        };
        if day.is_past {
            self.notify(Severity::Warning, messages::PAST_DATE);
            return false;
        }

        let selected = if self.pending.dates.remove(&date) {
            false
        } else {
            self.pending.dates.insert(date)
        };
        debug!(date = %day.iso_key, selected, "toggled date");
        selected
    }

    /// Keystroke-level edit: the text is stored as typed and never flagged.
    pub fn edit_time(&mut self, raw: impl Into<String>) {
        self.pending.time = raw.into();
        self.pending.time_valid = true;
    }

    /// Focus left the time field: validate, and normalize when valid.
    pub fn blur_time(&mut self) -> bool {
        let valid = validate_time_input(&self.pending.time);
        self.pending.time_valid = valid;
        if valid {
            self.pending.time = parse_time_input(&self.pending.time);
        }
        debug!(time = %self.pending.time, valid, "time field blurred");
        valid
    }

    pub fn pick_period(&mut self, index: usize) -> Option<&'static Period> {
        let period = PERIODS.get(index)?;
        self.pending.time = period.time.to_string();
        self.pending.time_valid = true;
        Some(period)
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Commits the pending selection into the candidate list.
    pub fn commit(&mut self) -> Result<usize, CommitRejection> {
        let result = self.candidates.commit(&self.pending.dates, &self.pending.time);
        match &result {
            Ok(added) => {
                info!(added, "pending selection committed");
                self.pending.clear();
            }
            Err(rejection @ CommitRejection::Duplicate) => {
                self.notify(Severity::Warning, rejection.to_string());
                self.pending.clear();
            }
            Err(rejection) => {
                self.notify(Severity::Warning, rejection.to_string());
            }
        }
        result
    }

    pub fn remove_candidate(&mut self, id: u64) -> bool {
        self.candidates.remove(id)
    }

    pub fn preview(&self) -> String {
        render_preview(&self.description, self.candidates.as_slice(), self.include_none_option)
    }

    /// Writes the preview to `sink`, reporting the outcome as a notification.
    pub fn copy_preview(&mut self, sink: &mut dyn ClipboardSink) -> bool {
        let preview = self.preview();
        if preview.is_empty() {
            self.notify(Severity::Error, messages::NOTHING_TO_COPY);
            return false;
        }

        match sink.write_text(&preview) {
            Ok(()) => {
                self.notify(Severity::Success, messages::COPIED);
                true
            }
            Err(err) => {
                warn!(error = %format!("{err:#}"), "clipboard write failed");
                self.notify(Severity::Warning, messages::COPY_FAILED);
                false
            }
        }
    }

    pub fn notify(&mut self, severity: Severity, message: impl Into<String>) -> u64 {
        self.notifier.notify(severity, message, Instant::now())
    }

    pub fn notification(&mut self) -> Option<&Notification> {
        self.notifier.active(Instant::now())
    }

    pub fn dismiss_notification(&mut self) {
        self.notifier.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::clock::FixedClock;

    // A Tuesday; the window runs 2026-10-18 ..= 2026-11-14.
    fn today() -> NaiveDate {
        date(2026, 10, 20)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn composer() -> Composer {
        Composer::new(ComposerSettings::default(), Box::new(FixedClock(today())))
    }

    fn last_message(composer: &mut Composer) -> Option<(Severity, String)> {
        composer.notification().map(|n| (n.severity, n.message.clone()))
    }

    #[test]
    fn toggles_dates_and_rejects_past_or_outside() {
        let mut composer = composer();
        assert!(composer.toggle_date(date(2026, 10, 21)));
        assert!(!composer.toggle_date(date(2026, 10, 21)));
        assert!(composer.pending().dates.is_empty());

        assert!(composer.toggle_date(today()));
        assert!(!composer.toggle_date(date(2026, 10, 19)));
        assert_eq!(
            last_message(&mut composer),
            Some((Severity::Warning, messages::PAST_DATE.to_string()))
        );
        assert!(!composer.toggle_date(date(2026, 11, 15)));
        assert_eq!(
            last_message(&mut composer),
            Some((Severity::Warning, messages::OUTSIDE_WINDOW.to_string()))
        );
        assert_eq!(composer.pending().dates.len(), 1);
    }

    #[test]
    fn validity_flips_only_on_blur() {
        let mut composer = composer();
        composer.edit_time("25");
        assert!(composer.pending().time_valid);
        assert!(!composer.blur_time());
        assert!(!composer.pending().time_valid);
        assert_eq!(composer.pending().time, "25");

        composer.edit_time("1430");
        assert!(composer.pending().time_valid);
        assert!(composer.blur_time());
        assert_eq!(composer.pending().time, "14:30");
    }

    #[test]
    fn period_pick_sets_time() {
        let mut composer = composer();
        composer.edit_time("xx");
        composer.blur_time();
        let period = composer.pick_period(1).expect("second period");
        assert_eq!(period.label, "2限目");
        assert_eq!(composer.pending().time, "10:50");
        assert!(composer.pending().time_valid);
        assert!(composer.pick_period(PERIODS.len()).is_none());
    }

    #[test]
    fn successful_commit_clears_selection() {
        let mut composer = composer();
        composer.toggle_date(date(2026, 10, 22));
        composer.toggle_date(date(2026, 10, 21));
        composer.edit_time("930");

        assert_eq!(composer.commit(), Ok(2));
        assert_eq!(composer.pending(), &PendingSelection::default());
        assert_eq!(composer.candidates().as_slice()[0].time_key(), "09:30");
        assert!(composer.notification().is_none());
    }

    #[test]
    fn invalid_or_incomplete_commit_keeps_selection() {
        let mut composer = composer();
        composer.edit_time("10:00");
        assert_eq!(composer.commit(), Err(CommitRejection::Incomplete));
        assert_eq!(composer.pending().time, "10:00");

        composer.toggle_date(date(2026, 10, 21));
        composer.edit_time("2560");
        composer.blur_time();
        assert_eq!(composer.commit(), Err(CommitRejection::InvalidTime));
        assert_eq!(
            last_message(&mut composer),
            Some((Severity::Warning, messages::INVALID_TIME.to_string()))
        );
        assert_eq!(composer.pending().time, "2560");
        assert_eq!(composer.pending().dates.len(), 1);
    }

    #[test]
    fn duplicate_commit_clears_selection() {
        let mut composer = composer();
        composer.toggle_date(date(2026, 10, 21));
        composer.edit_time("10:00");
        composer.commit().expect("first commit");

        composer.toggle_date(date(2026, 10, 21));
        composer.edit_time("1000");
        assert_eq!(composer.commit(), Err(CommitRejection::Duplicate));
        assert_eq!(composer.pending(), &PendingSelection::default());
        assert_eq!(composer.candidates().len(), 1);
        assert_eq!(
            last_message(&mut composer),
            Some((Severity::Warning, messages::DUPLICATE.to_string()))
        );
    }

    #[test]
    fn capacity_rejection_keeps_selection() {
        let mut composer = composer();
        for day in 21..=29 {
            composer.toggle_date(date(2026, 10, day));
        }
        composer.edit_time("10:00");
        composer.commit().expect("nine fit");

        composer.toggle_date(date(2026, 10, 30));
        composer.toggle_date(date(2026, 10, 31));
        composer.edit_time("10:00");
        assert_eq!(
            composer.commit(),
            Err(CommitRejection::CapacityExceeded {
                current: 9,
                remaining: 1
            })
        );
        assert_eq!(composer.pending().dates.len(), 2);
        assert_eq!(composer.pending().time, "10:00");
        assert_eq!(
            last_message(&mut composer),
            Some((
                Severity::Warning,
                "候補日は最大10個までです（現在9個、追加可能1個）".to_string()
            ))
        );
    }

    #[test]
    fn copy_reports_each_outcome() {
        let mut composer = composer();
        let mut sink = MemoryClipboard::default();

        assert!(!composer.copy_preview(&mut sink));
        assert_eq!(
            last_message(&mut composer),
            Some((Severity::Error, messages::NOTHING_TO_COPY.to_string()))
        );

        composer.set_include_none_option(true);
        assert!(composer.copy_preview(&mut sink));
        assert_eq!(sink.contents.as_deref(), Some("- ❌ どの日程も不可\n"));
        assert_eq!(
            last_message(&mut composer),
            Some((Severity::Success, messages::COPIED.to_string()))
        );

        sink.fail = true;
        assert!(!composer.copy_preview(&mut sink));
        assert_eq!(
            last_message(&mut composer),
            Some((Severity::Warning, messages::COPY_FAILED.to_string()))
        );
    }

    #[test]
    fn remove_unknown_id_is_silent() {
        let mut composer = composer();
        assert!(!composer.remove_candidate(42));
        assert!(composer.notification().is_none());
    }
}
