//! Error types for Nexus operations

use thiserror::Error;

/// Generative model / HTTP boundary errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("No generative model configured")]
    ProviderNotConfigured,

    #[error("Rate limited by {provider}: {message}")]
    RateLimited { provider: String, message: String },

    #[error("Request to {provider} failed with status {status}: {message}")]
    RequestFailed {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("Transport error talking to {provider}: {reason}")]
    Transport { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

/// Key-value storage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage backend failed: {reason}")]
    Backend { reason: String },

    #[error("Could not (de)serialize value for key {key}: {reason}")]
    Serialization { key: String, reason: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// User input validation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Could not parse configuration: {reason}")]
    Parse { reason: String },
}

/// Master error type for all Nexus errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NexusError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Nexus operations.
pub type NexusResult<T> = Result<T, NexusError>;

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// Coarse failure class driving retry and degradation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Quota or request-rate rejection. The only retryable class.
    RateLimited,
    NetworkOrServiceFailure,
    ParseFailure,
    ValidationFailure,
}

impl ErrorClass {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorClass::RateLimited)
    }
}

/// Substrings (lower-case) that mark a failure message as a rate limit.
pub const RATE_LIMIT_MARKERS: &[&str] = &["429", "resource_exhausted", "quota"];

/// Case-insensitive match of `message` against [`RATE_LIMIT_MARKERS`].
///
/// Numeric markers only count as a whole number, so `4290ms` is not `429`.
pub fn message_indicates_rate_limit(message: &str) -> bool {
    let lowered = message.to_lowercase();
    RATE_LIMIT_MARKERS
        .iter()
        .any(|marker| contains_marker(&lowered, marker))
}

fn contains_marker(haystack: &str, marker: &str) -> bool {
    if !marker.bytes().all(|b| b.is_ascii_digit()) {
        return haystack.contains(marker);
    }
    haystack.match_indices(marker).any(|(start, _)| {
        let end = start + marker.len();
        let before = haystack[..start].bytes().next_back();
        let after = haystack[end..].bytes().next();
        !before.is_some_and(|b| b.is_ascii_digit()) && !after.is_some_and(|b| b.is_ascii_digit())
    })
}

/// The upstream-supplied text of an error, without wrapper or provider names.
fn failure_text(err: &NexusError) -> Option<&str> {
    match err {
        NexusError::Llm(LlmError::RequestFailed { message, .. }) => Some(message.as_str()),
        NexusError::Llm(LlmError::Transport { reason, .. }) => Some(reason.as_str()),
        NexusError::Storage(StorageError::Backend { reason }) => Some(reason.as_str()),
        _ => None,
    }
}

/// Classify an error for retry/degradation decisions.
///
/// Structural signals win: an explicit rate-limit variant or HTTP 429 is
/// `RateLimited`; validation and malformed payloads never are. Everything
/// else falls back to the message heuristic.
pub fn classify_error(err: &NexusError) -> ErrorClass {
    match err {
        NexusError::Validation(_) => ErrorClass::ValidationFailure,
        NexusError::Llm(LlmError::RateLimited { .. }) => ErrorClass::RateLimited,
        NexusError::Llm(LlmError::RequestFailed { status: 429, .. }) => ErrorClass::RateLimited,
        NexusError::Llm(LlmError::InvalidResponse { .. }) => ErrorClass::ParseFailure,
        NexusError::Storage(StorageError::Serialization { .. }) => ErrorClass::ParseFailure,
        other => match failure_text(other) {
            Some(text) if message_indicates_rate_limit(text) => ErrorClass::RateLimited,
            _ => ErrorClass::NetworkOrServiceFailure,
        },
    }
}

impl NexusError {
    pub fn class(&self) -> ErrorClass {
        classify_error(self)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.class() == ErrorClass::RateLimited
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn transport(reason: &str) -> NexusError {
        NexusError::Llm(LlmError::Transport {
            provider: "gemini".to_string(),
            reason: reason.to_string(),
        })
    }

    #[test]
    fn test_llm_error_display_rate_limited() {
        let err = LlmError::RateLimited {
            provider: "gemini".to_string(),
            message: "RESOURCE_EXHAUSTED".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Rate limited"));
        assert!(msg.contains("gemini"));
    }

    #[test]
    fn test_config_error_display_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "cooldown.window_ms".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("cooldown.window_ms"));
        assert!(msg.contains("must be positive"));
    }

    #[test]
    fn test_nexus_error_from_variants() {
        let llm = NexusError::from(LlmError::ProviderNotConfigured);
        assert!(matches!(llm, NexusError::Llm(_)));

        let storage = NexusError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, NexusError::Storage(_)));

        let validation = NexusError::from(ValidationError::RequiredFieldMissing {
            field: "query".to_string(),
        });
        assert!(matches!(validation, NexusError::Validation(_)));

        let config = NexusError::from(ConfigError::Parse {
            reason: "eof".to_string(),
        });
        assert!(matches!(config, NexusError::Config(_)));
    }

    #[test]
    fn test_structural_rate_limits() {
        let explicit = NexusError::from(LlmError::RateLimited {
            provider: "gemini".to_string(),
            message: "slow down".to_string(),
        });
        assert_eq!(classify_error(&explicit), ErrorClass::RateLimited);

        let status = NexusError::from(LlmError::RequestFailed {
            provider: "gemini".to_string(),
            status: 429,
            message: "Too Many Requests".to_string(),
        });
        assert_eq!(classify_error(&status), ErrorClass::RateLimited);
    }

    #[test]
    fn test_message_vocabulary() {
        assert_eq!(classify_error(&transport("HTTP 429")), ErrorClass::RateLimited);
        assert_eq!(
            classify_error(&transport("Resource_Exhausted upstream")),
            ErrorClass::RateLimited
        );
        assert_eq!(classify_error(&transport("daily QUOTA hit")), ErrorClass::RateLimited);
        assert_eq!(
            classify_error(&transport("connection reset")),
            ErrorClass::NetworkOrServiceFailure
        );
    }

    #[test]
    fn test_only_failure_text_is_matched() {
        assert_eq!(
            classify_error(&transport("request timed out after 4290ms")),
            ErrorClass::NetworkOrServiceFailure
        );
        assert_eq!(classify_error(&transport("status=429")), ErrorClass::RateLimited);

        let provider_named = NexusError::from(LlmError::Transport {
            provider: "quota-proxy".to_string(),
            reason: "connection reset".to_string(),
        });
        assert_eq!(classify_error(&provider_named), ErrorClass::NetworkOrServiceFailure);

        let config = NexusError::from(ConfigError::MissingRequired {
            field: "quota".to_string(),
        });
        assert_eq!(classify_error(&config), ErrorClass::NetworkOrServiceFailure);

        let failed = NexusError::from(LlmError::RequestFailed {
            provider: "gemini".to_string(),
            status: 503,
            message: "RESOURCE_EXHAUSTED: try later".to_string(),
        });
        assert!(failed.is_rate_limited());
    }

    #[test]
    fn test_parse_and_validation_never_retryable() {
        let parse = NexusError::from(LlmError::InvalidResponse {
            provider: "gemini".to_string(),
            reason: "expected array".to_string(),
        });
        assert_eq!(parse.class(), ErrorClass::ParseFailure);
        assert!(!parse.class().is_retryable());

        let validation = NexusError::from(ValidationError::RequiredFieldMissing {
            field: "query".to_string(),
        });
        assert_eq!(validation.class(), ErrorClass::ValidationFailure);
    }

    proptest! {
        #[test]
        fn prop_marker_anywhere_is_rate_limited(
            prefix in "[a-z ]{0,12}",
            suffix in "[a-z ]{0,12}",
            marker in prop::sample::select(vec!["429", "RESOURCE_EXHAUSTED", "Quota", "quota"]),
        ) {
            let err = transport(&format!("{}{}{}", prefix, marker, suffix));
            prop_assert!(err.is_rate_limited());
        }

        #[test]
        fn prop_markerless_transport_not_retryable(reason in "[a-p ]{0,24}") {
            prop_assume!(!message_indicates_rate_limit(&reason));
            let err = transport(&reason);
            prop_assert!(!err.class().is_retryable());
        }
    }
}
