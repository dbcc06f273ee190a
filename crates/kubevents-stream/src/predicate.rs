use kubevents_types::EventRecord;

use crate::pattern::{MATCH_ALL, MessagePattern, PatternError};

/// Compiled filter criteria applied to every event.
///
/// Immutable for the run; built once from the user's kind and message
/// filters before the first fetch.
#[derive(Clone, Debug)]
pub struct MatchPredicate {
    /// Exact kind to accept; `None` accepts all kinds
    kind: Option<String>,

    /// Compiled message pattern
    message: MessagePattern,
}

impl MatchPredicate {
    /// Build a predicate from raw filter strings (`"all"` disables an axis).
    /// Pattern compilation failure is fatal here, never per event.
    pub fn new(kind_filter: &str, message_filter: &str) -> Result<Self, PatternError> {
        let kind = (kind_filter != MATCH_ALL).then(|| kind_filter.to_string());
        let message = MessagePattern::compile(message_filter)?;
        Ok(Self { kind, message })
    }

    /// Check whether an event passes every active filter.
    ///
    /// The kind check runs first and short-circuits the message check: a
    /// kind mismatch never pays for pattern evaluation. This order is the
    /// documented contract, kept stable in case future filters grow side
    /// effects or cost asymmetries.
    pub fn matches(&self, event: &EventRecord) -> bool {
        if let Some(want) = &self.kind {
            if event.kind != *want {
                return false;
            }
        }
        self.message.matches(&event.message)
    }

    /// Whether any filter axis is active
    pub fn is_unrestricted(&self) -> bool {
        self.kind.is_none() && self.message.is_any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use kubevents_types::RawEvent;

    fn record(kind: &str, message: &str) -> EventRecord {
        EventRecord::from_raw(RawEvent::new(
            1,
            Utc::now(),
            kind.to_string(),
            message.to_string(),
        ))
    }

    #[test]
    fn test_unrestricted_accepts_everything() {
        let predicate = MatchPredicate::new("all", "all").unwrap();
        assert!(predicate.is_unrestricted());
        assert!(predicate.matches(&record("Scheduled", "assigned pod")));
    }

    #[test]
    fn test_kind_mismatch_rejects() {
        let predicate = MatchPredicate::new("BackOff", "all").unwrap();
        assert!(!predicate.matches(&record("Scheduled", "assigned pod")));
        assert!(predicate.matches(&record("BackOff", "restarting container")));
    }

    #[test]
    fn test_message_pattern_rejects() {
        let predicate = MatchPredicate::new("all", "*disk*").unwrap();
        assert!(predicate.matches(&record("Warning", "disk pressure on node")));
        assert!(!predicate.matches(&record("Warning", "memory pressure on node")));
    }

    #[test]
    fn test_kind_check_short_circuits_message_check() {
        // The pattern matches the message, so a rejection can only come from
        // the kind check running first.
        let predicate = MatchPredicate::new("BackOff", "*pressure*").unwrap();
        assert!(!predicate.matches(&record("Scheduled", "disk pressure on node")));
    }

    #[test]
    fn test_both_filters_must_pass() {
        let predicate = MatchPredicate::new("BackOff", "*container*").unwrap();
        assert!(predicate.matches(&record("BackOff", "restarting container")));
        assert!(!predicate.matches(&record("BackOff", "image pull failed")));
    }
}
