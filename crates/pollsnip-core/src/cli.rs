use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

/// One commit: comma-separated date tokens and a time, `DATES@TIME`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    pub dates: Vec<String>,
    pub time: String,
}

impl std::str::FromStr for SlotSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (dates, time) = s
            .rsplit_once('@')
            .ok_or_else(|| anyhow!("expected DATES@TIME, got: {s}"))?;
        let dates: Vec<String> = dates
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self {
            dates,
            time: time.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pollsnip",
    version,
    about = "Compose date-poll text for chat apps",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_name = "KEY=VALUE",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the four-week calendar window
    Calendar,
    /// Print the quick-pick period table
    Periods,
    /// Build the poll text in one go
    Compose(ComposeArgs),
    /// Compose interactively, one command per line
    Session,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ComposeArgs {
    /// Event description placed above the candidates
    #[arg(short = 'd', long = "description")]
    pub description: Option<String>,

    /// Append the "no date works" line
    #[arg(long = "none-option")]
    pub none_option: bool,

    /// Dates and a time to add, e.g. `10/21,10/22@1430` or `2025-06-01@2限目`
    #[arg(
        long = "add",
        value_name = "DATES@TIME",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<SlotSpec>()),
        action = ArgAction::Append
    )]
    pub add: Vec<SlotSpec>,

    /// Print candidates and preview as JSON
    #[arg(long = "json")]
    pub json: bool,

    /// Copy the preview to the clipboard
    #[arg(long = "copy")]
    pub copy: bool,
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}
