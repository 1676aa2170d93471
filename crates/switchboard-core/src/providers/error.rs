//! Provider error types
//!
//! Every adapter reports failures as a `ProviderError`; `kind()` collapses
//! them into the small shared set the router's fallback logic reasons about.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Provider-independent failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorKind {
    RateLimited,
    Auth,
    Timeout,
    MalformedResponse,
    Unavailable,
    CapabilityMismatch,
    Cancelled,
    Other,
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderErrorKind::RateLimited => "rate_limited",
            ProviderErrorKind::Auth => "auth",
            ProviderErrorKind::Timeout => "timeout",
            ProviderErrorKind::MalformedResponse => "malformed_response",
            ProviderErrorKind::Unavailable => "unavailable",
            ProviderErrorKind::CapabilityMismatch => "capability_mismatch",
            ProviderErrorKind::Cancelled => "cancelled",
            ProviderErrorKind::Other => "other",
        };
        write!(f, "{}", s)
    }
}

/// Errors that can occur during provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Missing API key
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// API request failed with an HTTP-like status
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// Rate limited
    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: String, message: String },

    /// Credentials rejected
    #[error("{provider} authentication failed: {message}")]
    Auth { provider: String, message: String },

    /// The call did not complete in time
    #[error("{provider} timed out after {elapsed_ms}ms")]
    Timeout { provider: String, elapsed_ms: u64 },

    /// Invalid response from provider
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// The model cannot do what the request needs (found out at call time)
    #[error("{provider}/{model} does not support {capability}")]
    CapabilityMismatch {
        provider: String,
        model: String,
        capability: String,
    },

    /// No adapter registered under this provider name
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Create an API error
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a missing API key error
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate limited error
    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(provider: impl Into<String>, elapsed_ms: u64) -> Self {
        Self::Timeout {
            provider: provider.into(),
            elapsed_ms,
        }
    }

    /// Build an error from an HTTP status reported by the backend
    pub fn from_status(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        let provider = provider.into();
        let message = message.into();
        match status {
            429 => Self::RateLimited { provider, message },
            401 | 403 => Self::Auth { provider, message },
            _ => Self::ApiError {
                provider,
                status,
                message,
            },
        }
    }

    /// Build an error of the given kind (used by scripted adapters)
    pub fn from_kind(provider: impl Into<String>, kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        let provider = provider.into();
        let message = message.into();
        match kind {
            ProviderErrorKind::RateLimited => Self::RateLimited { provider, message },
            ProviderErrorKind::Auth => Self::Auth { provider, message },
            ProviderErrorKind::Timeout => Self::Timeout { provider, elapsed_ms: 0 },
            ProviderErrorKind::MalformedResponse => Self::InvalidResponse { provider, message },
            ProviderErrorKind::Unavailable => Self::ApiError {
                provider,
                status: 503,
                message,
            },
            ProviderErrorKind::CapabilityMismatch => Self::CapabilityMismatch {
                provider,
                model: String::new(),
                capability: message,
            },
            ProviderErrorKind::Cancelled => Self::Cancelled,
            ProviderErrorKind::Other => Self::Other(message),
        }
    }

    /// Turn a free-form backend error message into a typed error
    ///
    /// Only for failures that carry no typed status (transport errors,
    /// resolver failures). Looks for the usual markers so every adapter ends
    /// up in the same `ProviderErrorKind` buckets.
    pub fn classify(provider: impl Into<String>, message: impl Into<String>) -> Self {
        let provider = provider.into();
        let message = message.into();
        let lower = message.to_lowercase();

        let status = extract_status(&lower);

        if status == Some(429) || lower.contains("rate limit") || lower.contains("too many requests") {
            return Self::RateLimited { provider, message };
        }
        if matches!(status, Some(401) | Some(403))
            || lower.contains("unauthorized")
            || lower.contains("invalid api key")
            || lower.contains("invalid x-api-key")
        {
            return Self::Auth { provider, message };
        }
        if lower.contains("timed out") || lower.contains("timeout") || matches!(status, Some(408) | Some(504)) {
            return Self::Timeout { provider, elapsed_ms: 0 };
        }
        if lower.contains("does not support tools")
            || lower.contains("tool use is not supported")
            || lower.contains("does not support function calling")
        {
            return Self::CapabilityMismatch {
                provider,
                model: String::new(),
                capability: "tool_calling".to_string(),
            };
        }
        if let Some(status) = status {
            return Self::ApiError { provider, status, message };
        }
        if lower.contains("overloaded") || lower.contains("service unavailable") {
            return Self::ApiError {
                provider,
                status: 503,
                message,
            };
        }
        if lower.contains("json") || lower.contains("parse") || lower.contains("deserializ") {
            return Self::InvalidResponse { provider, message };
        }
        Self::Other(format!("{}: {}", provider, message))
    }

    /// Collapse into the shared failure category
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::MissingApiKey { .. } | Self::Auth { .. } => ProviderErrorKind::Auth,
            Self::RateLimited { .. } => ProviderErrorKind::RateLimited,
            Self::Timeout { .. } => ProviderErrorKind::Timeout,
            Self::InvalidResponse { .. } | Self::Json(_) => ProviderErrorKind::MalformedResponse,
            Self::CapabilityMismatch { .. } => ProviderErrorKind::CapabilityMismatch,
            Self::Cancelled => ProviderErrorKind::Cancelled,
            Self::NotConfigured(_) => ProviderErrorKind::Unavailable,
            Self::ApiError { status, .. } => match *status {
                429 => ProviderErrorKind::RateLimited,
                401 | 403 => ProviderErrorKind::Auth,
                408 | 504 => ProviderErrorKind::Timeout,
                500..=599 => ProviderErrorKind::Unavailable,
                _ => ProviderErrorKind::Other,
            },
            Self::Other(_) => ProviderErrorKind::Other,
        }
    }

    /// Whether the router may move on to the next fallback target
    pub fn is_retryable(&self) -> bool {
        self.kind() != ProviderErrorKind::Cancelled
    }
}

/// Status code in an error message
///
/// A code right after a `status` or `http` marker wins; otherwise the first
/// standalone three-digit 4xx/5xx token. Tokens glued to letters, as in
/// `405b`, are model names rather than codes.
fn extract_status(text: &str) -> Option<u16> {
    for marker in ["status", "http"] {
        for (pos, _) in text.match_indices(marker) {
            let window: String = text[pos + marker.len()..].chars().take(16).collect();
            if let Some(code) = first_status_token(&window) {
                return Some(code);
            }
        }
    }
    first_status_token(text)
}

fn first_status_token(text: &str) -> Option<u16> {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|tok| tok.len() == 3 && tok.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|tok| tok.parse::<u16>().ok())
        .find(|code| (400..600).contains(code))
}

pub type ProviderResult<T> = Result<T, ProviderError>;
