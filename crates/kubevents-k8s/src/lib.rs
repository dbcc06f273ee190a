//! Kubernetes event source for kubevents
//!
//! This crate provides kubeconfig/client plumbing and the adapter that
//! exposes a cluster's core event feed through the event source contract.

mod client;
mod collector;

pub use client::KubeClient;
pub use collector::{EventFeed, KubeEventCursor};

// Re-export types that are used in our public API
pub use kubevents_types::{CollectorSpec, EventCursor, EventSource, RawEvent, SourceError};
