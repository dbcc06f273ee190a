//! Event processing for kubevents
//!
//! This crate provides the filter predicate, kind catalog, output rendering,
//! and the collection loop that drives a paginated event cursor.

mod collect;
mod pattern;
mod predicate;
mod registry;
mod render;

pub use collect::{CollectError, CollectorConfig, RunReport, run};
pub use pattern::{MessagePattern, PatternError};
pub use predicate::MatchPredicate;
pub use registry::KindRegistry;
pub use render::{RenderError, render_aggregate, render_event};

// Re-export types used in our public API
pub use kubevents_types::{EventCursor, EventRecord, Format, Mode, RawEvent, SourceError};
