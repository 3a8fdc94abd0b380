use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::{debug, instrument};

use crate::calendar::find_day;
use crate::clipboard::ClipboardSink;
use crate::composer::Composer;
use crate::locale::{messages, period_index};
use crate::notify::Severity;
use crate::render::Renderer;

use super::report_notification;

const HELP: &str = "\
commands:
  cal                 show the calendar window
  date TOKEN..        toggle dates (YYYY-MM-DD, M/D or day of month)
  time TEXT           set the time (1430, 930 or 14:30)
  period N|LABEL      quick-pick a period (see `periods`)
  periods             list the periods
  add                 add the selected dates at the selected time
  rm ID               remove a candidate
  list                show the selection and candidates
  clear               drop the current selection
  desc TEXT           set the description (\\n for a line break)
  none on|off         toggle the \"no date works\" line
  preview             show the poll text
  copy                copy the poll text to the clipboard
  dismiss             hide the current notification
  quit                leave the session";

enum Flow {
    Continue,
    Quit,
}

/// Reads commands from `input` until `quit` or end of input.
#[instrument(skip_all)]
pub fn run<R: BufRead, W: Write>(
    composer: &mut Composer,
    renderer: &Renderer,
    input: R,
    out: &mut W,
    clipboard: &mut dyn ClipboardSink,
) -> anyhow::Result<()> {
    let mut last_shown = 0;

    writeln!(out, "pollsnip session: type `help` for commands")?;
    print_calendar(composer, renderer, out)?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line.context("failed to read session input")?;

        let flow = execute(composer, renderer, line.trim(), out, clipboard)?;
        report_notification(composer, renderer, &mut last_shown, out)?;
        if let Flow::Quit = flow {
            break;
        }
    }

    debug!(candidates = composer.candidates().len(), "session ended");
    Ok(())
}

fn execute<W: Write>(
    composer: &mut Composer,
    renderer: &Renderer,
    line: &str,
    out: &mut W,
    clipboard: &mut dyn ClipboardSink,
) -> anyhow::Result<Flow> {
    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    debug!(command, rest, "session command");

    match command {
        "" => {}
        "help" | "?" => writeln!(out, "{HELP}")?,
        "cal" | "calendar" => print_calendar(composer, renderer, out)?,
        "date" | "d" => {
            if rest.is_empty() {
                writeln!(out, "usage: date TOKEN..")?;
                return Ok(Flow::Continue);
            }
            let window = composer.calendar();
            for token in rest.split_whitespace() {
                match find_day(&window, token) {
                    Some(day) => {
                        composer.toggle_date(day.date);
                    }
                    None => {
                        composer.notify(Severity::Warning, format!("{} ({token})", messages::OUTSIDE_WINDOW));
                    }
                }
            }
            renderer.print_pending(out, composer.pending())?;
        }
        "time" | "t" => {
            composer.edit_time(rest);
            composer.blur_time();
            renderer.print_pending(out, composer.pending())?;
        }
        "period" | "p" => {
            let index = match rest.parse::<usize>() {
                Ok(n) if n >= 1 => Some(n - 1),
                _ => period_index(rest),
            };
            match index.and_then(|idx| composer.pick_period(idx)) {
                Some(_) => renderer.print_pending(out, composer.pending())?,
                None => {
                    writeln!(out, "unknown period: {rest}")?;
                    renderer.print_periods(out)?;
                }
            }
        }
        "periods" => renderer.print_periods(out)?,
        "add" | "a" => {
            if composer.commit().is_ok() {
                renderer.print_candidates(out, composer.candidates().as_slice())?;
            }
        }
        "rm" | "remove" => match rest.trim_start_matches('#').parse::<u64>() {
            Ok(id) => {
                composer.remove_candidate(id);
                renderer.print_candidates(out, composer.candidates().as_slice())?;
            }
            Err(_) => writeln!(out, "usage: rm ID")?,
        },
        "list" | "ls" => {
            renderer.print_pending(out, composer.pending())?;
            renderer.print_candidates(out, composer.candidates().as_slice())?;
        }
        "clear" => {
            composer.clear_pending();
            renderer.print_pending(out, composer.pending())?;
        }
        "desc" => composer.set_description(rest.replace("\\n", "\n")),
        "none" => {
            let include = match rest {
                "on" | "yes" | "true" => true,
                "off" | "no" | "false" => false,
                "" => !composer.include_none_option(),
                other => {
                    writeln!(out, "usage: none on|off (got {other})")?;
                    return Ok(Flow::Continue);
                }
            };
            composer.set_include_none_option(include);
            writeln!(out, "none option: {}", if include { "on" } else { "off" })?;
        }
        "preview" | "pv" => renderer.print_preview(out, &composer.preview())?,
        "copy" | "c" => {
            composer.copy_preview(clipboard);
        }
        "dismiss" => composer.dismiss_notification(),
        "quit" | "exit" | "q" => return Ok(Flow::Quit),
        other => writeln!(out, "unknown command: {other} (try `help`)")?,
    }

    Ok(Flow::Continue)
}

fn print_calendar<W: Write>(composer: &Composer, renderer: &Renderer, out: &mut W) -> anyhow::Result<()> {
    renderer.print_calendar(
        out,
        &composer.calendar(),
        &composer.pending().dates,
        composer.settings().week_start,
    )
}
