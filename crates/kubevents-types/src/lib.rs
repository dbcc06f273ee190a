//! Shared types for kubevents
//!
//! This crate contains the event data model and the event source contract
//! used across the kubevents crates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Display format for event timestamps (ANSIC style: `Mon Jan  2 15:04:05 2006`)
pub const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

// ============================================================================
// Event Model
// ============================================================================

/// A raw event as yielded by an event source cursor.
///
/// The `kind` discriminator is populated by the source adapter from an
/// explicit field, so the rest of the pipeline never inspects platform types.
#[derive(Clone, Debug)]
pub struct RawEvent {
    /// Monotonic key issued by the cursor; unique within one session,
    /// not ordered across reconnects
    pub key: u64,

    /// Source-supplied creation time
    pub created_at: DateTime<Utc>,

    /// Discriminator tag for the event's concrete category
    pub kind: String,

    /// Fully formatted human-readable description
    pub message: String,
}

impl RawEvent {
    pub fn new(key: u64, created_at: DateTime<Utc>, kind: String, message: String) -> Self {
        Self {
            key,
            created_at,
            kind,
            message,
        }
    }
}

/// The display-ready representation of one event.
///
/// Constructed once per raw event inside the collection loop. `visible` is
/// assigned exactly once during filtering and never serialized.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub key: u64,

    /// Timestamp pre-formatted for display; never used for ordering or dedup
    pub created_at: String,

    pub kind: String,

    pub message: String,

    /// True only if the event passed every active filter
    #[serde(skip)]
    pub visible: bool,
}

impl EventRecord {
    /// Normalize a raw event into its display form
    pub fn from_raw(raw: RawEvent) -> Self {
        Self {
            key: raw.key,
            created_at: raw.created_at.format(TIMESTAMP_FORMAT).to_string(),
            kind: raw.kind,
            message: raw.message,
            visible: true,
        }
    }
}

// ============================================================================
// Output Axes
// ============================================================================

/// Event display mode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// One line per visible event, streamed as events arrive
    List,
    /// Catalog of distinct kinds observed, rendered at run end
    Kinds,
    /// Event and kind counts, rendered at run end
    Summary,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Kinds => "kinds",
            Self::Summary => "summary",
        }
    }

    /// Whether this mode defers all output to an end-of-run aggregate
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Kinds | Self::Summary)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output serialization format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Event Source Contract
// ============================================================================

/// Server-side filter handed to an event source when creating a collector.
#[derive(Clone, Debug)]
pub struct CollectorSpec {
    /// Event kinds to include; empty means all kinds
    pub kind_allowlist: Vec<String>,

    /// Namespace scope; `None` reads the whole cluster (root entity,
    /// recursive)
    pub namespace: Option<String>,

    /// Start of the time window
    pub begin: DateTime<Utc>,

    /// Optional end of the time window (open-ended when `None`)
    pub end: Option<DateTime<Utc>>,
}

impl CollectorSpec {
    pub fn new(begin: DateTime<Utc>) -> Self {
        Self {
            kind_allowlist: Vec::new(),
            namespace: None,
            begin,
            end: None,
        }
    }
}

/// Error raised by an event source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Establishing the collector failed (connectivity, auth, bad scope)
    #[error("failed to create event collector: {0}")]
    Connect(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Reading a page of events failed mid-stream
    #[error("failed to read events: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A paginated, time-windowed feed of platform events.
#[allow(async_fn_in_trait)]
pub trait EventSource {
    type Cursor: EventCursor;

    /// Create a server-side collector scoped by `spec`
    async fn create_collector(&self, spec: CollectorSpec) -> Result<Self::Cursor, SourceError>;
}

/// A stateful read position within an event feed.
#[allow(async_fn_in_trait)]
pub trait EventCursor {
    /// Read up to `max` events past the current position. An empty result
    /// means no events are currently available, not necessarily end of feed.
    /// Must not block indefinitely.
    async fn read_next(&mut self, max: usize) -> Result<Vec<RawEvent>, SourceError>;

    /// Release server-side resources. Consumes the cursor, so a second
    /// release cannot compile; the collection loop guarantees this runs on
    /// every exit path.
    async fn release(self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_timestamp_format() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap();
        let record = EventRecord::from_raw(RawEvent::new(
            7,
            created,
            "Scheduled".to_string(),
            "assigned pod".to_string(),
        ));
        assert_eq!(record.created_at, "Tue Jan  2 15:04:05 2024");
        assert!(record.visible);
    }

    #[test]
    fn test_record_json_shape_hides_visibility() {
        let created = Utc.with_ymd_and_hms(2024, 1, 2, 15, 4, 5).unwrap();
        let record = EventRecord::from_raw(RawEvent::new(
            1,
            created,
            "Pulled".to_string(),
            "image pulled".to_string(),
        ));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["key"], 1);
        assert_eq!(json["kind"], "Pulled");
        assert_eq!(json["message"], "image pulled");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("visible").is_none());
    }
}
