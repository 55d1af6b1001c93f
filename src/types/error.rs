//! Unified Error Type System
//!
//! Centralized error types for the generation pipeline and everything around it.
//!
//! ## Provider Error Kinds
//!
//! - **Timeout**: Call exceeded its deadline (retry same provider)
//! - **RateLimited**: Provider throttled the call (retry same provider)
//! - **Unavailable**: Transport, auth or server failure (fallback to next)
//! - **InvalidResponse**: Empty or unusable payload (fallback to next)
//!
//! Provider errors never cross the pipeline boundary on their own. The pipeline
//! returns a `GenerationFailure` (orchestration, parse or schema failure); every
//! other subsystem (config, storage, CLI) uses `PlanError`.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::plan::PipelineStage;

// =============================================================================
// Provider Error Kinds
// =============================================================================

/// Normalized provider failure kinds used for retry and fallback decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    /// Call exceeded its timeout
    Timeout,
    /// Provider throttled the request
    RateLimited,
    /// Provider unreachable, refused auth, or failed server-side
    Unavailable,
    /// Provider answered with an empty or non-text payload
    InvalidResponse,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::RateLimited => write!(f, "RATE_LIMITED"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::InvalidResponse => write!(f, "INVALID_RESPONSE"),
        }
    }
}

impl ProviderErrorKind {
    /// Whether the same provider should be tried again after a backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout | Self::RateLimited)
    }
}

// =============================================================================
// Provider Error
// =============================================================================

/// Provider error with kind, context, and retry hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    /// Normalized kind for routing decisions
    pub kind: ProviderErrorKind,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// Provider-suggested wait before retrying
    pub retry_after: Option<Duration>,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.kind, self.message)
        } else {
            write!(f, "[{}] {}", self.kind, self.message)
        }
    }
}

impl std::error::Error for ProviderError {}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            provider: None,
            retry_after: None,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Timeout, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unavailable, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::InvalidResponse, message)
    }

    /// Attach provider context
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attach suggested retry delay
    pub fn retry_after(mut self, duration: Duration) -> Self {
        self.retry_after = Some(duration);
        self
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Result type of a single provider call
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps provider transport failures onto `ProviderErrorKind`
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify a free-form error message from any provider
    pub fn classify(message: &str, provider: &str) -> ProviderError {
        let lower = message.to_lowercase();

        if lower.contains("rate limit")
            || lower.contains("429")
            || lower.contains("too many requests")
            || lower.contains("quota exceeded")
            || lower.contains("overloaded")
        {
            let err = ProviderError::rate_limited(message).provider(provider);
            return match parse_retry_after(&lower) {
                Some(delay) => err.retry_after(delay),
                None => err,
            };
        }

        if lower.contains("timeout") || lower.contains("timed out") || lower.contains("deadline")
        {
            return ProviderError::timeout(message).provider(provider);
        }

        if lower.contains("empty response")
            || lower.contains("no content")
            || lower.contains("not valid utf-8")
            || lower.contains("unexpected payload")
        {
            return ProviderError::invalid_response(message).provider(provider);
        }

        // Auth, network, server and unknown failures all move on to the next provider
        ProviderError::unavailable(message).provider(provider)
    }

    /// Classify an HTTP status code (more accurate than string matching)
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> ProviderError {
        let err = match status {
            429 => ProviderError::rate_limited(message),
            408 | 504 => ProviderError::timeout(message),
            529 => ProviderError::rate_limited(message),
            _ => ProviderError::unavailable(message),
        };
        let err = err.provider(provider);
        match (err.kind, parse_retry_after(&message.to_lowercase())) {
            (ProviderErrorKind::RateLimited, Some(delay)) => err.retry_after(delay),
            _ => err,
        }
    }
}

/// Extract a retry-after hint in seconds from common rate-limit messages
fn parse_retry_after(lower: &str) -> Option<Duration> {
    for pattern in ["retry after ", "retry-after: ", "retry in ", "wait "] {
        if let Some(idx) = lower.find(pattern) {
            let rest = &lower[idx + pattern.len()..];
            if let Some(secs) = rest
                .split(|c: char| !c.is_ascii_digit())
                .find(|w| !w.is_empty())
                .and_then(|w| w.parse::<u64>().ok())
            {
                return Some(Duration::from_secs(secs.min(300)));
            }
        }
    }
    None
}

// =============================================================================
// Generation Failures
// =============================================================================

/// Every configured provider was tried and none produced a usable answer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("all providers failed (attempted: [{}]){}", .attempted_providers.join(", "), last_error_suffix(.last_error))]
pub struct OrchestrationFailure {
    /// Providers in the order they were attempted
    pub attempted_providers: Vec<String>,
    /// Error from the final attempt, if any attempt was made
    pub last_error: Option<ProviderError>,
}

fn last_error_suffix(last_error: &Option<ProviderError>) -> String {
    match last_error {
        Some(err) => format!(": {}", err),
        None => String::new(),
    }
}

/// Strict-mode parse failure listing the plan fields that were not found
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("plan is missing required sections: {}", .missing_fields.join(", "))]
pub struct ParseFailure {
    /// Missing fields by serialized field name, in canonical order
    pub missing_fields: Vec<String>,
}

/// An invariant of the business-idea schema does not hold
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema violation at '{field}': {message}")]
pub struct SchemaViolation {
    pub field: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Typed failure of a single generation request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationFailure {
    #[error(transparent)]
    Orchestration(#[from] OrchestrationFailure),

    #[error(transparent)]
    Parse(#[from] ParseFailure),

    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),
}

impl GenerationFailure {
    /// Pipeline stage the failure originated in
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Orchestration(_) => PipelineStage::AwaitingProvider,
            Self::Parse(_) => PipelineStage::Parsing,
            Self::SchemaViolation(_) => PipelineStage::Validating,
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum PlanError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationFailure),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Business idea not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, PlanError>;

/// Context extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> Result<T>;

    /// Add context using a closure (lazy evaluation)
    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> Result<T> {
        self.map_err(|e| PlanError::Storage(format!("{}: {}", context.into(), e)))
    }

    fn with_context_fn<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| PlanError::Storage(format!("{}: {}", f().into(), e)))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(ProviderErrorKind::RateLimited.to_string(), "RATE_LIMITED");
        assert_eq!(ProviderErrorKind::InvalidResponse.to_string(), "INVALID_RESPONSE");
    }

    #[test]
    fn test_kind_retryable() {
        assert!(ProviderErrorKind::Timeout.is_retryable());
        assert!(ProviderErrorKind::RateLimited.is_retryable());
        assert!(!ProviderErrorKind::Unavailable.is_retryable());
        assert!(!ProviderErrorKind::InvalidResponse.is_retryable());
    }

    #[test]
    fn test_classify_rate_limit_with_hint() {
        let err = ErrorClassifier::classify("Rate limit exceeded, retry after 12 seconds", "openai");
        assert_eq!(err.kind, ProviderErrorKind::RateLimited);
        assert_eq!(err.retry_after, Some(Duration::from_secs(12)));
        assert_eq!(err.provider.as_deref(), Some("openai"));
    }

    #[test]
    fn test_classify_timeout() {
        let err = ErrorClassifier::classify("operation timed out", "ollama");
        assert_eq!(err.kind, ProviderErrorKind::Timeout);
    }

    #[test]
    fn test_classify_defaults_to_unavailable() {
        let err = ErrorClassifier::classify("Invalid API key provided", "openai");
        assert_eq!(err.kind, ProviderErrorKind::Unavailable);
        let err = ErrorClassifier::classify("Connection refused", "ollama");
        assert_eq!(err.kind, ProviderErrorKind::Unavailable);
    }

    #[test]
    fn test_classify_http_status() {
        assert_eq!(
            ErrorClassifier::classify_http_status(429, "slow down", "x").kind,
            ProviderErrorKind::RateLimited
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(504, "gateway", "x").kind,
            ProviderErrorKind::Timeout
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(401, "unauthorized", "x").kind,
            ProviderErrorKind::Unavailable
        );
        assert_eq!(
            ErrorClassifier::classify_http_status(503, "down", "x").kind,
            ProviderErrorKind::Unavailable
        );
    }

    #[test]
    fn test_retry_after_capped() {
        let err = ErrorClassifier::classify("429: retry after 1000 seconds", "x");
        assert_eq!(err.retry_after, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::rate_limited("Too many requests").provider("openai");
        assert_eq!(err.to_string(), "[openai:RATE_LIMITED] Too many requests");
        assert_eq!(
            ProviderError::unavailable("down").to_string(),
            "[UNAVAILABLE] down"
        );
    }

    #[test]
    fn test_orchestration_failure_display() {
        let failure = OrchestrationFailure {
            attempted_providers: vec!["a".to_string(), "b".to_string()],
            last_error: Some(ProviderError::unavailable("down").provider("b")),
        };
        assert_eq!(
            failure.to_string(),
            "all providers failed (attempted: [a, b]): [b:UNAVAILABLE] down"
        );
    }

    #[test]
    fn test_parse_failure_display() {
        let failure = ParseFailure {
            missing_fields: vec!["fundingRequest".to_string(), "appendix".to_string()],
        };
        assert_eq!(
            failure.to_string(),
            "plan is missing required sections: fundingRequest, appendix"
        );
    }

    #[test]
    fn test_generation_failure_stage() {
        let failure = GenerationFailure::from(ParseFailure {
            missing_fields: vec![],
        });
        assert_eq!(failure.stage(), PipelineStage::Parsing);
        let failure = GenerationFailure::from(SchemaViolation::new("title", "empty"));
        assert_eq!(failure.stage(), PipelineStage::Validating);
    }
}
