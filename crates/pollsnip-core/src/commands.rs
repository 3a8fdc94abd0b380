pub mod compose;
pub mod session;

use std::io::{self, Write};

use tracing::{debug, instrument};

use crate::cli::Command;
use crate::clipboard::SystemClipboard;
use crate::clock::SystemClock;
use crate::composer::Composer;
use crate::config::Config;
use crate::render::Renderer;

pub fn new_composer(cfg: &Config) -> Composer {
    Composer::new(cfg.composer_settings(), Box::new(SystemClock::new(cfg.timezone)))
}

#[instrument(skip(cfg, renderer, command))]
pub fn dispatch(cfg: &Config, renderer: &Renderer, command: Command) -> anyhow::Result<()> {
    debug!(?command, "dispatching command");

    match command {
        Command::Calendar => {
            let composer = new_composer(cfg);
            let mut out = io::stdout().lock();
            renderer.print_calendar(
                &mut out,
                &composer.calendar(),
                &composer.pending().dates,
                composer.settings().week_start,
            )
        }
        Command::Periods => renderer.print_periods(&mut io::stdout().lock()),
        Command::Compose(args) => {
            let mut composer = new_composer(cfg);
            // The process exits right after copying.
            let mut clipboard = SystemClipboard::one_shot();
            compose::run(
                &mut composer,
                renderer,
                &args,
                &mut clipboard,
                &mut io::stdout().lock(),
                &mut io::stderr().lock(),
            )
        }
        Command::Session => {
            let mut composer = new_composer(cfg);
            let mut clipboard = SystemClipboard::new();
            session::run(
                &mut composer,
                renderer,
                io::stdin().lock(),
                &mut io::stdout().lock(),
                &mut clipboard,
            )
        }
    }
}

/// Prints the active notification once, tracking the last one shown.
pub(crate) fn report_notification<W: Write>(
    composer: &mut Composer,
    renderer: &Renderer,
    last_shown: &mut u64,
    out: &mut W,
) -> anyhow::Result<()> {
    if let Some(notification) = composer.notification()
        && notification.id != *last_shown
    {
        *last_shown = notification.id;
        renderer.print_notification(out, notification)?;
    }
    Ok(())
}
