use thiserror::Error;

use kubevents_types::{EventRecord, Format, Mode};

use crate::registry::KindRegistry;

/// A mode/target combination the renderer cannot produce.
///
/// Mode and format are orthogonal axes and every pair is handled explicitly;
/// the only invalid requests are rendering a single event in an aggregate
/// mode or an aggregate in list mode, and those surface as typed errors
/// rather than inline "unknown" strings.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("mode {0} does not render individual events")]
    NotPerEvent(Mode),

    #[error("mode {0} does not render an aggregate")]
    NotAggregate(Mode),

    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Render a single event record (list mode).
pub fn render_event(event: &EventRecord, mode: Mode, format: Format) -> Result<String, RenderError> {
    match (mode, format) {
        (Mode::List, Format::Text) => Ok(format!(
            "{} [{}] [{}] {}",
            event.key, event.created_at, event.kind, event.message
        )),
        (Mode::List, Format::Json) => Ok(serde_json::to_string(event)?),
        (Mode::Kinds | Mode::Summary, _) => Err(RenderError::NotPerEvent(mode)),
    }
}

/// Render the run's aggregate state (kinds and summary modes).
pub fn render_aggregate(
    total: u64,
    kinds: &KindRegistry,
    mode: Mode,
    format: Format,
) -> Result<String, RenderError> {
    match (mode, format) {
        (Mode::Kinds, Format::Text) => Ok(kinds.snapshot().join(", ")),
        (Mode::Kinds, Format::Json) => Ok(serde_json::to_string(kinds.snapshot())?),
        (Mode::Summary, Format::Text) => {
            Ok(format!("# Events: {}\n# Kinds:  {}", total, kinds.len()))
        }
        (Mode::Summary, Format::Json) => Ok(serde_json::to_string(&serde_json::json!({
            "events": total,
            "kinds": kinds.len(),
        }))?),
        (Mode::List, _) => Err(RenderError::NotAggregate(mode)),
    }
}
