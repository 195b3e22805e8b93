//! Intent execution pipeline: classified intents are dispatched to registered
//! handlers, short-term conversational context is maintained across turns,
//! and a pure decision layer gates expensive context retrieval.

pub mod context;
pub mod error;
pub mod executor;
pub mod handler;
pub mod intent;
pub mod metrics;
pub mod validator;

/// Object-safe async seam: trait methods return boxed futures so stores,
/// sinks, and handlers can live behind `dyn` while staying `Send`.
pub type BoxedFuture<T> = std::pin::Pin<Box<dyn Future<Output = T> + Send>>;

pub use context::{ContextStore, ConversationContext, InMemoryContextStore};
pub use error::IntentError;
pub use executor::{ExecutionResult, IntentExecutor};
pub use handler::{HandlerResponse, IntentHandler};
pub use intent::{Intent, IntentClassifier};
pub use metrics::{ExecutionRecord, InMemoryMetrics, MetricsSink};
pub use validator::{ContextType, get_required_context_types, should_retrieve_context};
