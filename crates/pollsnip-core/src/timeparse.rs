//! Free-text time input.
//!
//! Validation and parsing are deliberately separate calls: the input field
//! validates when focus leaves it and only then swaps in the canonical form.
//! `parse_time_input` echoes input it cannot normalize, so callers must
//! validate first.

use std::sync::OnceLock;

use chrono::NaiveTime;
use regex::Regex;

fn time_shape_re()
-> Option<&'static Regex> {
  static TIME_SHAPE: OnceLock<
    Option<Regex>
  > = OnceLock::new();
  TIME_SHAPE
    .get_or_init(|| {
      match Regex::new(
        r"^(?:(?P<colon_h>[0-9]{1,2}):(?P<colon_m>[0-9]{2})|(?P<four_h>[0-9]{2})(?P<four_m>[0-9]{2})|(?P<three_h>[0-9])(?P<three_m>[0-9]{2}))$",
      ) {
        | Ok(re) => Some(re),
        | Err(err) => {
          tracing::error!(
            error = %err,
            "internal time regex compile failure"
          );
          None
        }
      }
    })
    .as_ref()
}

/// Drops whitespace, counting a stray byte-order mark as whitespace too.
fn strip_whitespace(
  input: &str
) -> String {
  input
    .chars()
    .filter(|c| {
      !c.is_whitespace()
        && *c != '\u{feff}'
    })
    .collect()
}

/// Hour and minute of a recognized shape, before the range check.
fn match_shape(
  cleaned: &str
) -> Option<(u32, u32)> {
  let captures =
    time_shape_re()?.captures(cleaned)?;

  let (hour, minute) = [
    ("colon_h", "colon_m"),
    ("four_h", "four_m"),
    ("three_h", "three_m")
  ]
  .iter()
  .find_map(|(h, m)| {
    Some((
      captures.name(h)?,
      captures.name(m)?
    ))
  })?;

  Some((
    hour.as_str().parse::<u32>().ok()?,
    minute.as_str().parse::<u32>().ok()?
  ))
}

fn in_range(
  hour: u32,
  minute: u32
) -> bool {
  hour <= 23 && minute <= 59
}

/// True when the input is empty or names a valid wall-clock time.
#[must_use]
pub fn validate_time_input(
  input: &str
) -> bool {
  if input.is_empty() {
    return true;
  }

  let cleaned = strip_whitespace(input);
  match match_shape(&cleaned) {
    | Some((hour, minute)) => {
      in_range(hour, minute)
    }
    | None => false
  }
}

/// Canonical `HH:MM` for a valid input, otherwise the input unchanged.
#[must_use]
pub fn parse_time_input(
  input: &str
) -> String {
  if input.is_empty() {
    return String::new();
  }

  let cleaned = strip_whitespace(input);
  match match_shape(&cleaned) {
    | Some((hour, minute))
      if in_range(hour, minute) =>
    {
      format!("{hour:02}:{minute:02}")
    }
    | _ => {
      tracing::trace!(
        input,
        "time input left unparsed"
      );
      input.to_string()
    }
  }
}

/// Converts a canonical `HH:MM` key, built from its separate components.
#[must_use]
pub fn time_key_to_naive(
  key: &str
) -> Option<NaiveTime> {
  let (hour, minute) =
    key.split_once(':')?;
  if hour.len() != 2
    || minute.len() != 2
  {
    return None;
  }
  NaiveTime::from_hms_opt(
    hour.parse().ok()?,
    minute.parse().ok()?,
    0
  )
}

#[cfg(test)]
mod tests {
  use chrono::NaiveTime;

  use super::{
    parse_time_input,
    time_key_to_naive,
    validate_time_input
  };

  #[test]
  fn parses_four_digits() {
    assert!(validate_time_input("1430"));
    assert_eq!(
      parse_time_input("1430"),
      "14:30"
    );
  }

  #[test]
  fn parses_three_digits_as_single_digit_hour()
  {
    assert!(validate_time_input("930"));
    assert_eq!(
      parse_time_input("930"),
      "09:30"
    );
  }

  #[test]
  fn parses_colon_forms() {
    assert_eq!(
      parse_time_input("14:30"),
      "14:30"
    );
    assert_eq!(
      parse_time_input("9:05"),
      "09:05"
    );
    assert_eq!(
      parse_time_input("0:00"),
      "00:00"
    );
  }

  #[test]
  fn strips_whitespace_anywhere() {
    assert!(validate_time_input(
      " 14 : 30 "
    ));
    assert_eq!(
      parse_time_input("1 4 3 0"),
      "14:30"
    );
  }

  #[test]
  fn strips_byte_order_mark() {
    assert!(validate_time_input(
      "\u{feff}1430"
    ));
    assert_eq!(
      parse_time_input("\u{feff}9:05"),
      "09:05"
    );
    assert!(!validate_time_input(
      "\u{feff}"
    ));
  }

  #[test]
  fn rejects_out_of_range_and_echoes() {
    assert!(!validate_time_input("2560"));
    assert_eq!(
      parse_time_input("2560"),
      "2560"
    );
    assert!(!validate_time_input("24:00"));
    assert!(!validate_time_input("960"));
  }

  #[test]
  fn rejects_other_shapes() {
    for input in [
      "abc", "14:3", "14:300", "12345",
      "14", "1430x", "14-30", "１４３０"
    ] {
      assert!(
        !validate_time_input(input),
        "{input} should be rejected"
      );
      assert_eq!(
        parse_time_input(input),
        input
      );
    }
  }

  #[test]
  fn empty_is_valid_but_blank_is_not() {
    assert!(validate_time_input(""));
    assert_eq!(parse_time_input(""), "");
    assert!(!validate_time_input("   "));
  }

  #[test]
  fn converts_canonical_key() {
    assert_eq!(
      time_key_to_naive("09:10"),
      NaiveTime::from_hms_opt(9, 10, 0)
    );
    assert_eq!(
      time_key_to_naive("9:10"),
      None
    );
    assert_eq!(
      time_key_to_naive("25:00"),
      None
    );
  }
}
