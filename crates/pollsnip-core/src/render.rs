use std::collections::BTreeSet;
use std::io::{self, IsTerminal, Write};

use chrono::{Datelike, NaiveDate, Weekday};
use unicode_width::UnicodeWidthStr;

use crate::calendar::{CalendarDay, weekday_header};
use crate::candidate::Candidate;
use crate::composer::PendingSelection;
use crate::config::Config;
use crate::locale::{PERIODS, messages};
use crate::notify::{Notification, Severity};
use crate::preview::format_candidate;

const CELL_WIDTH: usize = 6;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.color && io::stdout().is_terminal(),
        }
    }

    /// No escape codes regardless of the terminal.
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip_all, fields(days = window.len()))]
    pub fn print_calendar<W: Write>(
        &self,
        out: &mut W,
        window: &[CalendarDay],
        selected: &BTreeSet<NaiveDate>,
        week_start: Weekday,
    ) -> anyhow::Result<()> {
        if let (Some(first), Some(last)) = (window.first(), window.last()) {
            writeln!(out, "{} 〜 {}", first.iso_key, last.iso_key)?;
        }

        let header: String = weekday_header(week_start)
            .into_iter()
            .map(|label| pad_left(label, CELL_WIDTH))
            .collect();
        writeln!(out, "{header}")?;

        for week in window.chunks(7) {
            let mut line = String::new();
            for day in week {
                line.push_str(&self.calendar_cell(day, selected.contains(&day.date)));
            }
            writeln!(out, "{}", line.trim_end())?;
        }
        Ok(())
    }

    fn calendar_cell(&self, day: &CalendarDay, is_selected: bool) -> String {
        let label = day.grid_label();
        let text = if day.is_past {
            format!("({label})")
        } else if day.is_today && is_selected {
            format!("[{label}*]")
        } else if day.is_today {
            format!("[{label}]")
        } else if is_selected {
            format!("{label}*")
        } else {
            label
        };

        let padded = pad_left(&text, CELL_WIDTH);
        let code = if day.is_past {
            Some("90")
        } else if is_selected {
            Some("7")
        } else {
            match day.date.weekday() {
                Weekday::Sun => Some("31"),
                Weekday::Sat => Some("34"),
                _ => None,
            }
        };
        match code {
            Some(code) => self.paint(&padded, code),
            None => padded,
        }
    }

    pub fn print_periods<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        for (idx, period) in PERIODS.iter().enumerate() {
            writeln!(out, "{:>2}. {} {}", idx + 1, pad_right(period.label, 6), period.time)?;
        }
        Ok(())
    }

    pub fn print_candidates<W: Write>(&self, out: &mut W, candidates: &[Candidate]) -> anyhow::Result<()> {
        if candidates.is_empty() {
            writeln!(out, "{}", messages::EMPTY_LIST)?;
            return Ok(());
        }

        let id_width = candidates
            .iter()
            .map(|c| c.id().to_string().len())
            .max()
            .unwrap_or(1);
        for candidate in candidates {
            let id = format!("#{:<id_width$}", candidate.id());
            writeln!(
                out,
                "{} {} {}",
                self.paint(&id, "33"),
                candidate.glyph(),
                format_candidate(candidate.date(), candidate.time())
            )?;
        }
        Ok(())
    }

    pub fn print_pending<W: Write>(&self, out: &mut W, pending: &PendingSelection) -> anyhow::Result<()> {
        let dates = pending
            .dates
            .iter()
            .map(|date| format!("{}/{}", date.month(), date.day()))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "dates: {}", if dates.is_empty() { "-" } else { dates.as_str() })?;
        writeln!(
            out,
            "time:  {}",
            if pending.time.is_empty() {
                "-"
            } else {
                pending.time.as_str()
            }
        )?;
        if !pending.time_valid && !pending.time.is_empty() {
            writeln!(out, "{}", self.paint(messages::TIME_FORMAT_ERROR, "31"))?;
            writeln!(out, "{}", messages::TIME_FORMAT_HINT)?;
        }
        Ok(())
    }

    pub fn print_notification<W: Write>(&self, out: &mut W, notification: &Notification) -> anyhow::Result<()> {
        let code = match notification.severity {
            Severity::Success => "32",
            Severity::Error => "31",
            Severity::Warning => "33",
        };
        let tag = format!("[{}]", notification.severity);
        writeln!(out, "{} {}", self.paint(&tag, code), notification.message)?;
        Ok(())
    }

    /// The preview, or a placeholder when there is nothing to show.
    pub fn print_preview<W: Write>(&self, out: &mut W, preview: &str) -> anyhow::Result<()> {
        if preview.is_empty() {
            writeln!(out, "{}", self.paint(messages::EMPTY_PREVIEW, "90"))?;
        } else {
            write!(out, "{preview}")?;
        }
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn pad_left(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{}{text}", " ".repeat(pad))
}

fn pad_right(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(UnicodeWidthStr::width(text));
    format!("{text}{}", " ".repeat(pad))
}
