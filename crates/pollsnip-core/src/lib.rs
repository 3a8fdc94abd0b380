pub mod calendar;
pub mod candidate;
pub mod cli;
pub mod clipboard;
pub mod clock;
pub mod commands;
pub mod composer;
pub mod config;
pub mod locale;
pub mod notify;
pub mod preview;
pub mod render;
pub mod timeparse;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting pollsnip"
  );

  let mut cfg = config::Config::load(
    cli.config.as_deref()
  )
  .context("failed to load config")?;
  cfg
    .apply_overrides(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
    .context(
      "invalid --rc override"
    )?;
  debug!(?cfg, "effective config");

  let renderer =
    render::Renderer::new(&cfg);

  commands::dispatch(
    &cfg,
    &renderer,
    cli.command
  )?;

  info!("done");
  Ok(())
}
