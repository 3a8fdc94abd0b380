use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::{
  Context,
  anyhow
};
use chrono::Weekday;
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::composer::ComposerSettings;
use crate::notify::DEFAULT_TTL;

const CONFIG_ENV_VAR: &str =
  "POLLSNIP_CONFIG";
const TIMEZONE_ENV_VAR: &str =
  "POLLSNIP_TIMEZONE";
const CONFIG_FILE_NAME: &str =
  "config.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
  timezone:     Option<String>,
  color:        Option<bool>,
  calendar:     CalendarSection,
  notification: NotificationSection
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CalendarSection {
  week_start: Option<String>
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NotificationSection {
  ttl_ms: Option<u64>
}

#[derive(Debug, Clone)]
pub struct Config {
  pub timezone:         Option<Tz>,
  pub color:            bool,
  pub week_start:       Weekday,
  pub notification_ttl: Duration
}

impl Default for Config {
  fn default() -> Self {
    Self {
      timezone:         None,
      color:            true,
      week_start:       Weekday::Sun,
      notification_ttl: DEFAULT_TTL
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg =
      match resolve_config_path(
        config_override
      )? {
        | Some(path) => {
          info!(config = %path.display(), "loading config");
          Self::load_file(&path)?
        }
        | None => {
          debug!(
            "no config file found; using \
             defaults"
          );
          Self::default()
        }
      };

    cfg.apply_timezone_env(
      std::env::var(TIMEZONE_ENV_VAR).ok()
    )?;

    Ok(cfg)
  }

  /// Applies the value of `POLLSNIP_TIMEZONE`, if set, over the file.
  pub fn apply_timezone_env(
    &mut self,
    raw: Option<String>
  ) -> anyhow::Result<()> {
    if let Some(raw) = raw {
      debug!(timezone = %raw, "timezone from environment");
      self.set("timezone", &raw).with_context(
        || format!("invalid {TIMEZONE_ENV_VAR}")
      )?;
    }
    Ok(())
  }

  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    Self::from_toml_str(&text)
      .with_context(|| {
        format!(
          "invalid config {}",
          path.display()
        )
      })
  }

  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let parsed: FileConfig =
      toml::from_str(text)?;
    let mut cfg = Self::default();

    if let Some(tz) = parsed.timezone {
      cfg.set("timezone", &tz)?;
    }
    if let Some(color) = parsed.color {
      cfg.color = color;
    }
    if let Some(week_start) =
      parsed.calendar.week_start
    {
      cfg.set(
        "calendar.week_start",
        &week_start
      )?;
    }
    if let Some(ttl_ms) =
      parsed.notification.ttl_ms
    {
      cfg.notification_ttl =
        Duration::from_millis(ttl_ms);
    }

    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      self.set(&key, &v)?;
    }
    Ok(())
  }

  /// Sets one dotted key, as written in the config file.
  pub fn set(
    &mut self,
    key: &str,
    value: &str
  ) -> anyhow::Result<()> {
    let value = value.trim();
    match key {
      | "timezone" => {
        self.timezone =
          parse_timezone(value)?;
      }
      | "color" => {
        self.color = parse_bool(value)
          .ok_or_else(|| {
            anyhow!(
              "invalid color setting: \
               {value}"
            )
          })?;
      }
      | "calendar.week_start" => {
        self.week_start =
          parse_week_start(value)?;
      }
      | "notification.ttl_ms" => {
        let ms = value
          .parse::<u64>()
          .with_context(|| {
            format!(
              "invalid \
               notification.ttl_ms: \
               {value}"
            )
          })?;
        self.notification_ttl =
          Duration::from_millis(ms);
      }
      | other => {
        return Err(anyhow!(
          "unknown config key: {other}"
        ));
      }
    }
    Ok(())
  }

  #[must_use]
  pub fn composer_settings(
    &self
  ) -> ComposerSettings {
    ComposerSettings {
      week_start:       self.week_start,
      notification_ttl: self
        .notification_ttl
    }
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed == "/dev/null" {
      return Ok(None);
    }
    if !trimmed.is_empty() {
      return Ok(Some(PathBuf::from(
        trimmed
      )));
    }
  }

  let Some(config_dir) =
    dirs::config_dir()
  else {
    warn!(
      "cannot determine config \
       directory; using defaults"
    );
    return Ok(None);
  };
  let candidate = config_dir
    .join("pollsnip")
    .join(CONFIG_FILE_NAME);
  if candidate.exists() {
    return Ok(Some(candidate));
  }

  Ok(None)
}

/// Empty means the system local zone.
fn parse_timezone(
  raw: &str
) -> anyhow::Result<Option<Tz>> {
  if raw.is_empty()
    || raw.eq_ignore_ascii_case("local")
  {
    return Ok(None);
  }
  raw
    .parse::<Tz>()
    .map(Some)
    .map_err(|err| {
      anyhow!(
        "invalid timezone {raw}: {err}"
      )
    })
}

fn parse_week_start(
  raw: &str
) -> anyhow::Result<Weekday> {
  match raw
    .to_ascii_lowercase()
    .as_str()
  {
    | "sunday" | "sun" => {
      Ok(Weekday::Sun)
    }
    | "monday" | "mon" => {
      Ok(Weekday::Mon)
    }
    | other => {
      Err(anyhow!(
        "invalid calendar.week_start: \
         {other} (expected sunday or \
         monday)"
      ))
    }
  }
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Some(true),
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}
