use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;

/// How a skill API call ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallOutcome {
    Success { status: u16 },
    Denied { reason: String },
    TransportError { message: String },
    HttpError { status: u16 },
}

/// One audited skill API call, allowed or not.
#[derive(Debug, Clone, Serialize)]
pub struct CallRecord {
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub skill: String,
    pub method: String,
    pub url: String,
    pub outcome: CallOutcome,
    pub latency_ms: u64,
}

/// Bounded in-memory rolling log of skill API calls.
///
/// Not persisted across restarts; records are `Serialize` so an embedding
/// application can ship them elsewhere.
#[derive(Debug)]
pub struct CallAuditLog {
    entries: Mutex<VecDeque<CallRecord>>,
    capacity: usize,
}

impl CallAuditLog {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn record(&self, record: CallRecord) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(record);
    }

    /// Most recent entries first, at most `limit`.
    #[must_use]
    pub fn get(&self, limit: usize) -> Vec<CallRecord> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        entries.iter().rev().take(limit).cloned().collect()
    }
}
