use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::context::{ContextStore, ConversationContext};
use crate::handler::{HandlerResponse, IntentHandler};
use crate::intent::Intent;
use crate::metrics::{ExecutionRecord, MetricsSink};

const SOURCE_LABEL: &str = "intent_executor";
const NO_INTENT_MESSAGE: &str = "Sorry, I didn't understand that.";
const UNKNOWN_INTENT_MESSAGE: &str = "I don't know how to handle that yet.";
const GENERIC_ERROR_MESSAGE: &str = "Sorry, I encountered an error.";

/// Uniform result returned to the caller for every execution path.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    pub message: String,
    pub data: Option<Value>,
    pub latency_ms: u64,
}

impl ExecutionResult {
    fn failure(message: &str, latency_ms: u64) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            data: None,
            latency_ms,
        }
    }
}

/// Routes classified intents to registered handlers, maintains conversational
/// context, and reports execution metrics.
///
/// Constructed once at startup with its collaborators injected; handlers are
/// registered by intent name. Collaborator failures degrade (empty context,
/// dropped metrics) but never fail or block the primary response.
pub struct IntentExecutor {
    handlers: HashMap<String, Box<dyn IntentHandler>>,
    context: Arc<dyn ContextStore>,
    metrics: Arc<dyn MetricsSink>,
}

impl IntentExecutor {
    #[must_use]
    pub fn new(context: Arc<dyn ContextStore>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            handlers: HashMap::new(),
            context,
            metrics,
        }
    }

    /// Register the handler for an intent name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, handler: Box<dyn IntentHandler>) {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            tracing::debug!(intent = %name, "intent handler replaced");
        }
    }

    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Execute one classified intent.
    ///
    /// `None` (classification failed) and empty-name intents fail fast; an
    /// unregistered intent name produces a polite failure rather than an
    /// error. Handler errors are contained here and surface as a generic
    /// failure message, with detail only in the logs.
    pub async fn execute(
        &self,
        intent: Option<&Intent>,
        user_id: &str,
        session_id: &str,
    ) -> ExecutionResult {
        let started = Instant::now();

        let Some(intent) = intent.filter(|i| !i.name.is_empty()) else {
            return ExecutionResult::failure(NO_INTENT_MESSAGE, 0);
        };

        let Some(handler) = self.handlers.get(&intent.name) else {
            tracing::warn!(intent = %intent.name, "no handler registered for intent");
            let latency_ms = elapsed_ms(started);
            self.record(intent, user_id, false, latency_ms).await;
            return ExecutionResult::failure(UNKNOWN_INTENT_MESSAGE, latency_ms);
        };

        let context = match self.context.get_context(user_id, session_id).await {
            Ok(context) => context,
            Err(e) => {
                tracing::warn!(error = %e, "context read failed; continuing with empty context");
                ConversationContext::default()
            }
        };

        let response = match handler.handle(intent, user_id, &context).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(intent = %intent.name, error = %e, "intent handler failed");
                HandlerResponse::fail(GENERIC_ERROR_MESSAGE)
            }
        };

        if response.success
            && let Err(e) = self
                .context
                .update_from_intent(user_id, session_id, &intent.name, &intent.slots)
                .await
        {
            tracing::warn!(error = %e, "context update failed");
        }

        let latency_ms = elapsed_ms(started);
        self.record(intent, user_id, response.success, latency_ms).await;

        ExecutionResult {
            success: response.success,
            message: response.message,
            data: response.data,
            latency_ms,
        }
    }

    async fn record(&self, intent: &Intent, user_id: &str, success: bool, latency_ms: u64) {
        let record = ExecutionRecord {
            user_id: user_id.to_string(),
            intent_name: intent.name.clone(),
            tier: intent.tier,
            confidence: intent.confidence,
            latency_ms,
            success,
            input_text: intent.original_text.clone(),
            source: SOURCE_LABEL.to_string(),
        };
        if let Err(e) = self.metrics.record_execution(record).await {
            tracing::warn!(error = %e, "failed to record execution metrics");
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
