use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};

use crate::candidate::Candidate;
use crate::locale::{NONE_OPTION_GLYPH, NONE_OPTION_LABEL, PERIODS, WEEKDAY_LABELS};

pub fn period_label(time_key: &str) -> Option<&'static str> {
    PERIODS
        .iter()
        .find(|period| period.time == time_key)
        .map(|period| period.label)
}

pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize]
}

/// `6/1(日) 10:00`, or `6/2(月) 2限目（10:50）` for a named period.
pub fn format_candidate(date: NaiveDate, time: NaiveTime) -> String {
    let clock = format!("{}:{:02}", time.hour(), time.minute());
    let day = format!("{}/{}({})", date.month(), date.day(), weekday_label(date));

    match period_label(&time.format("%H:%M").to_string()) {
        Some(label) => format!("{day} {label}（{clock}）"),
        None => format!("{day} {clock}"),
    }
}

/// The text copied to the clipboard. Empty when there is nothing to show.
pub fn render_preview(description: &str, candidates: &[Candidate], include_none_option: bool) -> String {
    let mut out = String::new();

    if !description.is_empty() {
        out.push_str(description);
        out.push_str("\n\n");
    }

    for candidate in candidates {
        let _ = writeln!(
            out,
            "- {} {}",
            candidate.glyph(),
            format_candidate(candidate.date(), candidate.time())
        );
    }

    if include_none_option {
        let _ = writeln!(out, "- {NONE_OPTION_GLYPH} {NONE_OPTION_LABEL}");
    }

    out
}
