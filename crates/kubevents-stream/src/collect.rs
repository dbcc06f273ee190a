use std::io::Write;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use kubevents_types::{EventCursor, EventRecord, Format, Mode, SourceError};

use crate::predicate::MatchPredicate;
use crate::registry::KindRegistry;
use crate::render::{RenderError, render_aggregate, render_event};

/// Fixed pause before re-polling an exhausted feed in follow mode. The
/// source rate-limits server-side, so this stays a flat interval rather
/// than an exponential backoff.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Pagination and output controls for one run, immutable once built.
#[derive(Clone, Debug)]
pub struct CollectorConfig {
    pub mode: Mode,
    pub format: Format,

    /// Events requested per fetch
    pub page_size: usize,

    /// Keep polling after the feed drains
    pub follow: bool,
}

/// Fatal failure inside the collection loop.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Aggregate state left over when the loop terminates. Individual events are
/// not retained across iterations.
#[derive(Debug)]
pub struct RunReport {
    /// Total events processed, visible or not
    pub total: u64,

    /// Distinct kinds in first-seen order
    pub kinds: KindRegistry,

    /// Whether the run ended via operator cancellation
    pub cancelled: bool,
}

/// Drive a cursor to completion: fetch pages, filter and catalog each event,
/// stream list-mode output, and render the aggregate modes at run end.
///
/// The cursor is released exactly once on every exit path, including fetch
/// errors and cancellation.
pub async fn run<C, W>(
    mut cursor: C,
    config: &CollectorConfig,
    predicate: &MatchPredicate,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<RunReport, CollectError>
where
    C: EventCursor,
    W: Write,
{
    let result = drain(&mut cursor, config, predicate, cancel, out).await;
    cursor.release().await;

    let report = result?;
    tracing::debug!(
        total = report.total,
        kinds = report.kinds.len(),
        cancelled = report.cancelled,
        "collection finished"
    );

    // Aggregate modes report once at run end; a cancelled follow run still
    // gets its report, otherwise `--follow --mode summary` could never
    // produce output.
    if config.mode.is_aggregate() {
        let rendered = render_aggregate(report.total, &report.kinds, config.mode, config.format)?;
        writeln!(out, "{rendered}")?;
    }

    Ok(report)
}

async fn drain<C, W>(
    cursor: &mut C,
    config: &CollectorConfig,
    predicate: &MatchPredicate,
    cancel: &CancellationToken,
    out: &mut W,
) -> Result<RunReport, CollectError>
where
    C: EventCursor,
    W: Write,
{
    let mut kinds = KindRegistry::new();
    let mut total = 0u64;

    let cancelled = loop {
        if cancel.is_cancelled() {
            break true;
        }

        let page = cursor.read_next(config.page_size).await?;

        if page.is_empty() {
            if !config.follow {
                break false;
            }
            tokio::select! {
                _ = cancel.cancelled() => break true,
                _ = tokio::time::sleep(POLL_INTERVAL) => continue,
            }
        }

        tracing::debug!(count = page.len(), "processing event page");
        for raw in page {
            let mut record = EventRecord::from_raw(raw);
            record.visible = predicate.matches(&record);

            // Kind tracking is independent of visibility: operators want the
            // full catalog even while filtering messages.
            kinds.add(&record.kind);
            total += 1;

            if record.visible && config.mode == Mode::List {
                let rendered = render_event(&record, config.mode, config.format)?;
                writeln!(out, "{rendered}")?;
            }
        }
    };

    Ok(RunReport {
        total,
        kinds,
        cancelled,
    })
}
