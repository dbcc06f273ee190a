/// Insertion-ordered catalog of the distinct event kinds observed so far.
///
/// Append-only for the lifetime of the run; order reflects first-seen order
/// across the whole stream, including events the filters hid. Membership is a
/// linear scan — volumes are bounded by operator-chosen page counts.
#[derive(Clone, Debug, Default)]
pub struct KindRegistry {
    kinds: Vec<String>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a kind; no-op if already present
    pub fn add(&mut self, kind: &str) {
        if !self.kinds.iter().any(|k| k == kind) {
            self.kinds.push(kind.to_string());
        }
    }

    /// Ordered view of every kind seen so far
    pub fn snapshot(&self) -> &[String] {
        &self.kinds
    }

    /// Number of distinct kinds
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_is_idempotent() {
        let mut registry = KindRegistry::new();
        for _ in 0..5 {
            registry.add("Scheduled");
        }
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot(), ["Scheduled"]);
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let mut registry = KindRegistry::new();
        registry.add("Pulled");
        registry.add("Scheduled");
        registry.add("Pulled");
        registry.add("BackOff");
        registry.add("Scheduled");
        assert_eq!(registry.snapshot(), ["Pulled", "Scheduled", "BackOff"]);
    }
}
