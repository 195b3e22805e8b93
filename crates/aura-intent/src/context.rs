use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::Value;

use crate::BoxedFuture;
use crate::error::IntentError;

/// Short-term slot memory per user and session, used to resolve anaphora
/// ("add that too"). Fields are overwritten per-intent, not merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationContext {
    pub last_items: Vec<String>,
    pub last_device: Option<String>,
    pub last_list: Option<String>,
    pub last_area: Option<String>,
    pub last_time: Option<String>,
    pub last_intent: Option<String>,
}

impl ConversationContext {
    /// Overwrite the fields named by `slots`; untouched fields keep their
    /// previous values so earlier turns remain resolvable.
    pub fn apply_intent(&mut self, intent_name: &str, slots: &HashMap<String, Value>) {
        self.last_intent = Some(intent_name.to_string());

        if let Some(value) = slots.get("item").or_else(|| slots.get("items")) {
            self.last_items = string_values(value);
        }
        if let Some(value) = slots.get("device").and_then(Value::as_str) {
            self.last_device = Some(value.to_string());
        }
        if let Some(value) = slots.get("list").and_then(Value::as_str) {
            self.last_list = Some(value.to_string());
        }
        if let Some(value) = slots.get("area").and_then(Value::as_str) {
            self.last_area = Some(value.to_string());
        }
        if let Some(value) = slots.get("time").and_then(Value::as_str) {
            self.last_time = Some(value.to_string());
        }
    }
}

fn string_values(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        other => vec![other.to_string()],
    }
}

/// Read-modify-write store for conversational context.
///
/// Owned by the embedding application; failures here must never fail the
/// primary response path.
pub trait ContextStore: Send + Sync {
    fn get_context(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> BoxedFuture<Result<ConversationContext, IntentError>>;

    fn update_from_intent(
        &self,
        user_id: &str,
        session_id: &str,
        intent_name: &str,
        slots: &HashMap<String, Value>,
    ) -> BoxedFuture<Result<(), IntentError>>;
}

/// Process-local context store keyed by `(user_id, session_id)`.
#[derive(Debug, Default)]
pub struct InMemoryContextStore {
    sessions: Mutex<HashMap<(String, String), ConversationContext>>,
}

impl InMemoryContextStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ContextStore for InMemoryContextStore {
    fn get_context(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> BoxedFuture<Result<ConversationContext, IntentError>> {
        let sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let context = sessions
            .get(&(user_id.to_string(), session_id.to_string()))
            .cloned()
            .unwrap_or_default();
        Box::pin(std::future::ready(Ok(context)))
    }

    fn update_from_intent(
        &self,
        user_id: &str,
        session_id: &str,
        intent_name: &str,
        slots: &HashMap<String, Value>,
    ) -> BoxedFuture<Result<(), IntentError>> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let context = sessions
            .entry((user_id.to_string(), session_id.to_string()))
            .or_default();
        context.apply_intent(intent_name, slots);
        Box::pin(std::future::ready(Ok(())))
    }
}
