use std::collections::HashMap;
use std::time::{Duration, Instant};

use aura_skills::Skill;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::audit::{CallAuditLog, CallOutcome, CallRecord};
use crate::config::ExecutorConfig;

const ALLOWED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Structured outcome of a skill API call. Never a panic, never a propagated
/// error: rejections and transport failures all land here.
#[derive(Debug, Clone, Serialize)]
pub struct ApiCallResult {
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<String>,
    pub status_code: Option<u16>,
}

impl ApiCallResult {
    fn ok(data: Value, status: u16) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status_code: Some(status),
        }
    }

    fn failure(error: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            status_code,
        }
    }
}

/// Single choke point for all skill-initiated network calls.
///
/// A skill's `allowed_endpoints` declaration is only honored here, after the
/// executor's own host and method gates; nothing else in the process trusts
/// that metadata at face value.
#[derive(Debug)]
pub struct SkillApiExecutor {
    client: reqwest::Client,
    config: ExecutorConfig,
    audit: CallAuditLog,
}

impl SkillApiExecutor {
    #[must_use]
    pub fn new(config: ExecutorConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()
            .unwrap_or_default();
        let audit = CallAuditLog::new(config.audit_capacity);

        Self {
            client,
            config,
            audit,
        }
    }

    /// Execute an API call on behalf of a skill, enforcing the allowlist
    /// gates in order: `api_only`, URL shape, internal host, method, and the
    /// skill's own declared endpoints. A rejected call never reaches the
    /// network.
    pub async fn execute_api_call(
        &self,
        skill: &Skill,
        method: &str,
        url: &str,
        body: Option<&Value>,
        headers: Option<&HashMap<String, String>>,
    ) -> ApiCallResult {
        let started = Instant::now();
        let method_up = method.to_ascii_uppercase();

        if !skill.api_only {
            return self.deny(skill, &method_up, url, "skill is not API-only", started);
        }

        let Ok(parsed) = Url::parse(url) else {
            let reason = format!("invalid URL: {url}");
            return self.deny(skill, &method_up, url, &reason, started);
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            let reason = format!("scheme not allowed: {}", parsed.scheme());
            return self.deny(skill, &method_up, url, &reason, started);
        }

        let host = parsed.host_str().unwrap_or_default();
        if !self
            .config
            .allowed_hosts
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(host))
        {
            let reason = format!("host not in internal allowlist: {host}");
            return self.deny(skill, &method_up, url, &reason, started);
        }

        if !ALLOWED_METHODS.contains(&method_up.as_str()) {
            let reason = format!("method not allowed: {method_up}");
            return self.deny(skill, &method_up, url, &reason, started);
        }

        if !endpoint_allowed(&skill.allowed_endpoints, &method_up, parsed.path()) {
            let reason = format!(
                "endpoint not declared by skill: {method_up} {}",
                parsed.path()
            );
            return self.deny(skill, &method_up, url, &reason, started);
        }

        let Ok(http_method) = method_up.parse::<reqwest::Method>() else {
            let reason = format!("method not allowed: {method_up}");
            return self.deny(skill, &method_up, url, &reason, started);
        };

        let mut request = self.client.request(http_method, parsed);
        if let Some(body) = body {
            request = request
                .header("content-type", "application/json")
                .body(body.to_string());
        }
        if let Some(headers) = headers {
            for (name, value) in headers {
                request = request.header(name, value);
            }
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let message = if e.is_timeout() {
                    format!("request timed out after {}s", self.config.timeout_secs)
                } else {
                    e.to_string()
                };
                tracing::warn!(
                    skill = %skill.name,
                    url,
                    error = %message,
                    "skill API call transport failure"
                );
                self.audit_record(
                    skill,
                    &method_up,
                    url,
                    CallOutcome::TransportError {
                        message: message.clone(),
                    },
                    started,
                );
                return ApiCallResult::failure(message, None);
            }
        };

        let status = response.status().as_u16();
        let is_success = response.status().is_success();

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                let message = format!("failed to read response body: {e}");
                self.audit_record(
                    skill,
                    &method_up,
                    url,
                    CallOutcome::TransportError {
                        message: message.clone(),
                    },
                    started,
                );
                return ApiCallResult::failure(message, Some(status));
            }
        };

        if bytes.len() > self.config.max_response_bytes {
            let message = format!(
                "response too large: {} bytes (max: {})",
                bytes.len(),
                self.config.max_response_bytes
            );
            self.audit_record(
                skill,
                &method_up,
                url,
                CallOutcome::TransportError {
                    message: message.clone(),
                },
                started,
            );
            return ApiCallResult::failure(message, Some(status));
        }

        let text = String::from_utf8_lossy(&bytes).into_owned();

        if is_success {
            self.audit_record(
                skill,
                &method_up,
                url,
                CallOutcome::Success { status },
                started,
            );
            let data = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return ApiCallResult::ok(data, status);
        }

        tracing::warn!(skill = %skill.name, url, status, "skill API call returned error status");
        self.audit_record(
            skill,
            &method_up,
            url,
            CallOutcome::HttpError { status },
            started,
        );
        ApiCallResult::failure(
            format!(
                "HTTP {status}: {}",
                truncate_chars(&text, self.config.max_error_body_chars)
            ),
            Some(status),
        )
    }

    /// Most recent audited calls first, at most `limit`.
    #[must_use]
    pub fn get_call_log(&self, limit: usize) -> Vec<CallRecord> {
        self.audit.get(limit)
    }

    fn deny(
        &self,
        skill: &Skill,
        method: &str,
        url: &str,
        reason: &str,
        started: Instant,
    ) -> ApiCallResult {
        tracing::warn!(skill = %skill.name, method, url, reason, "skill API call denied");
        self.audit_record(
            skill,
            method,
            url,
            CallOutcome::Denied {
                reason: reason.to_string(),
            },
            started,
        );
        ApiCallResult::failure(reason, None)
    }

    fn audit_record(
        &self,
        skill: &Skill,
        method: &str,
        url: &str,
        outcome: CallOutcome,
        started: Instant,
    ) {
        self.audit.record(CallRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            skill: skill.name.clone(),
            method: method.to_string(),
            url: url.to_string(),
            outcome,
            latency_ms: elapsed_ms(started),
        });
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// `"METHOD /path"` entries; a trailing `*` turns the path into a prefix.
fn endpoint_allowed(endpoints: &[String], method: &str, path: &str) -> bool {
    endpoints.iter().any(|entry| {
        let Some((entry_method, entry_path)) = entry.split_once(' ') else {
            return false;
        };
        if !entry_method.eq_ignore_ascii_case(method) {
            return false;
        }
        match entry_path.strip_suffix('*') {
            Some(prefix) => path.starts_with(prefix),
            None => path == entry_path,
        }
    })
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
