// Upstream failure classification.
// Maps errors from the GitHub client onto a small retry-aware taxonomy.

use std::error::Error as _;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::ShowcaseError;

use super::types::RateLimit;

/// Category of an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Quota exhausted; wait for the reset.
    RateLimit,
    /// Request exceeded the configured timeout.
    Timeout,
    /// DNS failure, refused or reset connection.
    Network,
    /// Account does not exist; a configuration problem.
    NotFound,
    /// 5xx from upstream.
    Server,
    Unknown,
}

impl FailureKind {
    /// Whether retrying later could succeed.
    pub fn can_retry(self) -> bool {
        !matches!(self, FailureKind::RateLimit | FailureKind::NotFound)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::RateLimit => "rate_limit",
            FailureKind::Timeout => "timeout",
            FailureKind::Network => "network",
            FailureKind::NotFound => "not_found",
            FailureKind::Server => "server",
            FailureKind::Unknown => "unknown",
        }
    }
}

/// A classified upstream failure, as reported to API consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchFailure {
    #[serde(rename = "type")]
    pub kind: FailureKind,
    pub message: String,
    pub can_retry: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

impl FetchFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            can_retry: kind.can_retry(),
            status: None,
            reset_at: None,
        }
    }

    /// Classify an error from the GitHub client.
    ///
    /// HTTP status is checked first (403 with an exhausted quota, then 404,
    /// then 5xx). Transport errors are then matched on their kind and on
    /// the messages in their source chain. Anything else is `Unknown`.
    pub fn classify(err: &ShowcaseError) -> Self {
        match err {
            ShowcaseError::Status {
                status,
                rate_limit,
                message,
            } => {
                let kind = classify_status(*status, rate_limit)
                    .or_else(|| classify_message(message))
                    .unwrap_or(FailureKind::Unknown);
                let mut failure = Self::new(kind, describe_status(kind, *status, message));
                failure.status = Some(status.as_u16());
                if kind == FailureKind::RateLimit {
                    failure.reset_at = rate_limit.reset_at();
                }
                failure
            }
            ShowcaseError::Http(e) => {
                let kind = classify_transport(e);
                let mut failure = Self::new(kind, e.to_string());
                failure.status = e.status().map(|s| s.as_u16());
                failure
            }
            other => {
                let message = other.to_string();
                let kind = classify_message(&message).unwrap_or(FailureKind::Unknown);
                Self::new(kind, message)
            }
        }
    }

    /// HTTP status to answer with when no cached data can cover this failure.
    pub fn http_status(&self) -> StatusCode {
        match self.kind {
            FailureKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

fn classify_status(status: StatusCode, rate_limit: &RateLimit) -> Option<FailureKind> {
    if status == StatusCode::FORBIDDEN && rate_limit.is_exhausted() {
        Some(FailureKind::RateLimit)
    } else if status == StatusCode::NOT_FOUND {
        Some(FailureKind::NotFound)
    } else if status.is_server_error() {
        Some(FailureKind::Server)
    } else {
        None
    }
}

fn classify_transport(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        return FailureKind::Timeout;
    }
    if let Some(kind) = classify_status_of(err) {
        return kind;
    }

    let mut source = err.source();
    let mut chain = err.to_string();
    while let Some(inner) = source {
        chain.push_str(": ");
        chain.push_str(&inner.to_string());
        source = inner.source();
    }

    if let Some(kind) = classify_message(&chain) {
        return kind;
    }
    if err.is_connect() {
        return FailureKind::Network;
    }
    FailureKind::Unknown
}

fn classify_status_of(err: &reqwest::Error) -> Option<FailureKind> {
    err.status()
        .and_then(|status| classify_status(status, &RateLimit::default()))
}

/// Match well-known timeout and connectivity phrases.
fn classify_message(message: &str) -> Option<FailureKind> {
    let msg = message.to_lowercase();

    let timeout = ["timed out", "timeout", "etimedout", "aborted"];
    if timeout.iter().any(|pattern| msg.contains(pattern)) {
        return Some(FailureKind::Timeout);
    }

    let network = [
        "dns error",
        "failed to lookup",
        "enotfound",
        "connection refused",
        "econnrefused",
        "connection reset",
        "econnreset",
        "network is unreachable",
    ];
    if network.iter().any(|pattern| msg.contains(pattern)) {
        return Some(FailureKind::Network);
    }

    None
}

fn describe_status(kind: FailureKind, status: StatusCode, message: &str) -> String {
    let summary = match kind {
        FailureKind::RateLimit => "GitHub API rate limit exceeded",
        FailureKind::NotFound => "GitHub account not found",
        FailureKind::Server => "GitHub API server error",
        _ => "GitHub API request failed",
    };
    if message.is_empty() {
        format!("{} ({})", summary, status.as_u16())
    } else {
        format!("{} ({}): {}", summary, status.as_u16(), message)
    }
}
