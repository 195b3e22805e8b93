use serde::Deserialize;

/// Tunables for the skill API executor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Hostnames a skill call may target: loopback plus internal container
    /// service names. Anything else is rejected before the request is built.
    pub allowed_hosts: Vec<String>,
    pub timeout_secs: u64,
    pub max_response_bytes: usize,
    /// Error response bodies are truncated to this many characters in the
    /// returned failure.
    pub max_error_body_chars: usize,
    /// Rolling audit log retains this many most recent entries.
    pub audit_capacity: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            allowed_hosts: vec!["localhost".into(), "127.0.0.1".into()],
            timeout_secs: 30,
            max_response_bytes: 256 * 1024,
            max_error_body_chars: 512,
            audit_capacity: 200,
        }
    }
}
