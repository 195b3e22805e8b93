use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::BoxedFuture;
use crate::error::IntentError;

/// One intent execution, as reported to the metrics collector.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    pub user_id: String,
    pub intent_name: String,
    pub tier: u8,
    pub confidence: f64,
    pub latency_ms: u64,
    pub success: bool,
    pub input_text: String,
    /// Which pipeline stage produced the record.
    pub source: String,
}

/// Fire-and-forget metrics collaborator; a failing sink must never fail the
/// execution that fed it.
pub trait MetricsSink: Send + Sync {
    fn record_execution(&self, record: ExecutionRecord) -> BoxedFuture<Result<(), IntentError>>;
}

/// Process-local sink, mostly for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct InMemoryMetrics {
    records: Mutex<Vec<ExecutionRecord>>,
}

impl InMemoryMetrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<ExecutionRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl MetricsSink for InMemoryMetrics {
    fn record_execution(&self, record: ExecutionRecord) -> BoxedFuture<Result<(), IntentError>> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record);
        Box::pin(std::future::ready(Ok(())))
    }
}
