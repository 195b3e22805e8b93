use std::collections::HashMap;

use serde_json::Value;

/// One classified user utterance.
///
/// Tiers: 0 = deterministic pattern match, 1 = conversational, 2+ =
/// memory/complex. Created fresh per message by a classifier and consumed
/// once by the executor; never persisted.
#[derive(Debug, Clone)]
pub struct Intent {
    pub name: String,
    /// Extracted parameter name to value.
    pub slots: HashMap<String, Value>,
    /// 0.0 to 1.0.
    pub confidence: f64,
    pub tier: u8,
    pub original_text: String,
}

impl Intent {
    /// A tier-0 intent with full confidence and no slots.
    #[must_use]
    pub fn new(name: &str, original_text: &str) -> Self {
        Self {
            name: name.to_string(),
            slots: HashMap::new(),
            confidence: 1.0,
            tier: 0,
            original_text: original_text.to_string(),
        }
    }

    #[must_use]
    pub fn with_slot(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.slots.insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn with_tier(mut self, tier: u8) -> Self {
        self.tier = tier;
        self
    }

    #[must_use]
    pub fn slot_str(&self, key: &str) -> Option<&str> {
        self.slots.get(key).and_then(Value::as_str)
    }
}

/// Maps free text to a named intent with extracted slots.
///
/// The pattern-matching classifier itself lives outside this crate; this is
/// the seam the pipeline consumes it through.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Option<Intent>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let intent = Intent::new("ListAdd", "add bread to shopping list");
        assert_eq!(intent.name, "ListAdd");
        assert_eq!(intent.tier, 0);
        assert!((intent.confidence - 1.0).abs() < f64::EPSILON);
        assert!(intent.slots.is_empty());
    }

    #[test]
    fn with_slot_and_tier() {
        let intent = Intent::new("MemoryRecall", "what did i say")
            .with_tier(2)
            .with_slot("topic", "errands");
        assert_eq!(intent.tier, 2);
        assert_eq!(intent.slot_str("topic"), Some("errands"));
        assert_eq!(intent.slot_str("missing"), None);
    }
}
