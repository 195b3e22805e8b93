#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("handler error: {0}")]
    Handler(String),

    #[error("context store error: {0}")]
    Context(String),

    #[error("metrics error: {0}")]
    Metrics(String),
}
