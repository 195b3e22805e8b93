use serde_json::Value;

use crate::BoxedFuture;
use crate::context::ConversationContext;
use crate::error::IntentError;
use crate::intent::Intent;

/// What a domain handler reports back to the executor.
#[derive(Debug, Clone)]
pub struct HandlerResponse {
    pub success: bool,
    /// User-facing natural-language message.
    pub message: String,
    pub data: Option<Value>,
}

impl HandlerResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// Domain-specific handler for one intent name (e.g. adding an item to a
/// list). Handlers are registered into the executor's map by name; an `Err`
/// is contained at the executor boundary and never reaches the caller.
pub trait IntentHandler: Send + Sync {
    fn handle(
        &self,
        intent: &Intent,
        user_id: &str,
        context: &ConversationContext,
    ) -> BoxedFuture<Result<HandlerResponse, IntentError>>;
}
