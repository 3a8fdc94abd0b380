use std::sync::OnceLock;

use anyhow::anyhow;
use chrono::{
  Datelike,
  Duration,
  NaiveDate,
  Weekday
};
use regex::Regex;

/// Days offered for selection: four full weeks.
pub const WINDOW_DAYS: i64 = 28;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
  pub date:     NaiveDate,
  pub iso_key:  String,
  pub is_today: bool,
  pub is_past:  bool
}

impl CalendarDay {
  /// Short grid label: `M/D` on the first of a month, `D` otherwise.
  #[must_use]
  pub fn grid_label(&self) -> String {
    if self.date.day() == 1 {
      format!(
        "{}/{}",
        self.date.month(),
        self.date.day()
      )
    } else {
      self.date.day().to_string()
    }
  }
}

#[must_use]
pub fn format_date_key(
  date: NaiveDate
) -> String {
  format!(
    "{:04}-{:02}-{:02}",
    date.year(),
    date.month(),
    date.day()
  )
}

fn date_key_re()
-> Option<&'static Regex> {
  static DATE_KEY: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  DATE_KEY
    .get_or_init(|| {
      Regex::new(
        r"^(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})$",
      )
      .ok()
    })
    .as_ref()
}

/// Parses `YYYY-MM-DD` from its separate components.
pub fn parse_date_key(
  key: &str
) -> anyhow::Result<NaiveDate> {
  let re = date_key_re().ok_or_else(
    || {
      anyhow!(
        "internal regex compile \
         failure"
      )
    }
  )?;
  let caps = re
    .captures(key.trim())
    .ok_or_else(|| {
      anyhow!(
        "expected YYYY-MM-DD, got: \
         {key}"
      )
    })?;

  let year = caps["year"]
    .parse::<i32>()?;
  let month = caps["month"]
    .parse::<u32>()?;
  let day =
    caps["day"].parse::<u32>()?;

  NaiveDate::from_ymd_opt(
    year, month, day
  )
  .ok_or_else(|| {
    anyhow!("no such date: {key}")
  })
}

fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  date
    .checked_add_signed(Duration::days(
      days
    ))
    .unwrap_or(date)
}

#[must_use]
pub fn start_of_week(
  day: NaiveDate,
  week_start: Weekday
) -> NaiveDate {
  let day_idx = day
    .weekday()
    .num_days_from_monday()
    as i64;
  let start_idx = week_start
    .num_days_from_monday()
    as i64;
  let diff =
    (7 + day_idx - start_idx) % 7;
  add_days(day, -diff)
}

/// The 28-day window beginning on the week start at or before `today`.
#[tracing::instrument]
pub fn generate_window(
  today: NaiveDate,
  week_start: Weekday
) -> Vec<CalendarDay> {
  let start =
    start_of_week(today, week_start);

  (0..WINDOW_DAYS)
    .map(|offset| {
      let date = add_days(start, offset);
      CalendarDay {
        date,
        iso_key: format_date_key(date),
        is_today: date == today,
        is_past: date < today
      }
    })
    .collect()
}

/// Weekday labels in grid order for the given week start.
#[must_use]
pub fn weekday_header(
  week_start: Weekday
) -> Vec<&'static str> {
  let first = week_start
    .num_days_from_sunday()
    as usize;
  (0..7)
    .map(|i| {
      crate::locale::WEEKDAY_LABELS
        [(first + i) % 7]
    })
    .collect()
}

/// Resolves `YYYY-MM-DD`, `M/D` or a bare day-of-month against the window.
///
/// A bare day is unambiguous: no month is shorter than the window.
pub fn find_day<'a>(
  window: &'a [CalendarDay],
  token: &str
) -> Option<&'a CalendarDay> {
  let token = token.trim();

  if let Ok(date) =
    parse_date_key(token)
  {
    return window
      .iter()
      .find(|day| day.date == date);
  }

  if let Some((month, day)) =
    token.split_once('/')
  {
    let month =
      month.parse::<u32>().ok()?;
    let day = day.parse::<u32>().ok()?;
    return window.iter().find(|d| {
      d.date.month() == month
        && d.date.day() == day
    });
  }

  let day = token.parse::<u32>().ok()?;
  window
    .iter()
    .find(|d| d.date.day() == day)
}
