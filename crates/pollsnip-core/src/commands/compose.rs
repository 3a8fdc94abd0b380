use std::io::Write;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::calendar::find_day;
use crate::candidate::Candidate;
use crate::cli::{ComposeArgs, SlotSpec};
use crate::clipboard::ClipboardSink;
use crate::composer::Composer;
use crate::locale::{messages, period_index};
use crate::notify::Severity;
use crate::render::Renderer;

use super::report_notification;

#[derive(Debug, Serialize)]
struct ComposeOutput<'a> {
    description: &'a str,
    include_none_option: bool,
    candidates: &'a [Candidate],
    preview: String,
}

/// Applies every `--add` slot in order, then prints or copies the result.
///
/// Rejected slots are reported on `err` and do not stop the run.
#[instrument(skip_all, fields(slots = args.add.len()))]
pub fn run<W: Write, E: Write>(
    composer: &mut Composer,
    renderer: &Renderer,
    args: &ComposeArgs,
    clipboard: &mut dyn ClipboardSink,
    out: &mut W,
    err: &mut E,
) -> anyhow::Result<()> {
    let mut last_shown = 0;

    if let Some(description) = &args.description {
        composer.set_description(description.clone());
    }
    composer.set_include_none_option(args.none_option);

    for slot in &args.add {
        apply_slot(composer, renderer, slot, &mut last_shown, err)?;
    }

    let preview = composer.preview();
    if args.json {
        let output = ComposeOutput {
            description: composer.description(),
            include_none_option: composer.include_none_option(),
            candidates: composer.candidates().as_slice(),
            preview: preview.clone(),
        };
        serde_json::to_writer_pretty(&mut *out, &output)?;
        writeln!(out)?;
    } else if preview.is_empty() {
        renderer.print_preview(err, &preview)?;
    } else {
        renderer.print_preview(out, &preview)?;
    }

    if args.copy {
        composer.copy_preview(clipboard);
        report_notification(composer, renderer, &mut last_shown, err)?;
    }

    info!(candidates = composer.candidates().len(), "composition finished");
    Ok(())
}

fn apply_slot<E: Write>(
    composer: &mut Composer,
    renderer: &Renderer,
    slot: &SlotSpec,
    last_shown: &mut u64,
    err: &mut E,
) -> anyhow::Result<()> {
    debug!(?slot, "applying slot");
    composer.clear_pending();

    let window = composer.calendar();
    for token in &slot.dates {
        match find_day(&window, token) {
            Some(day) => {
                if !composer.pending().dates.contains(&day.date) {
                    composer.toggle_date(day.date);
                }
            }
            None => {
                composer.notify(Severity::Warning, format!("{} ({token})", messages::OUTSIDE_WINDOW));
            }
        }
        report_notification(composer, renderer, last_shown, err)?;
    }

    match period_index(&slot.time) {
        Some(index) => {
            composer.pick_period(index);
        }
        None => {
            composer.edit_time(slot.time.clone());
            composer.blur_time();
        }
    }

    // Rejections surface as notifications.
    let _ = composer.commit();
    report_notification(composer, renderer, last_shown, err)
}
