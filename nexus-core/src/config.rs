//! Configuration types
//!
//! Layering: [`Default`] values, then an optional TOML document, then
//! `NEXUS_*` environment overrides. Call [`NexusConfig::validate`] after
//! assembling.

use crate::constants::*;
use crate::error::{ConfigError, NexusResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Serde adapter storing a [`Duration`] as integer milliseconds.
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

// ============================================================================
// RETRY
// ============================================================================

/// Exponential backoff policy for rate-limited calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    #[serde(rename = "initial_backoff_ms", with = "duration_ms")]
    pub initial_backoff: Duration,
    #[serde(rename = "max_backoff_ms", with = "duration_ms")]
    pub max_backoff: Duration,
    pub backoff_multiplier: f32,
}

impl RetryConfig {
    /// Policy for user-initiated operations.
    pub fn interactive() -> Self {
        Self {
            max_retries: DEFAULT_INTERACTIVE_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_INTERACTIVE_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
            backoff_multiplier: BACKOFF_MULTIPLIER,
        }
    }

    /// Policy for the ambient trending feed.
    pub fn background() -> Self {
        Self {
            max_retries: DEFAULT_BACKGROUND_MAX_RETRIES,
            initial_backoff: Duration::from_millis(DEFAULT_BACKGROUND_INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
            backoff_multiplier: BACKOFF_MULTIPLIER,
        }
    }

    /// Doubling policy with an explicit retry count and first delay.
    ///
    /// The cap is raised when needed so it never binds within `max_retries`.
    pub fn new(max_retries: u32, initial_backoff: Duration) -> Self {
        let mut policy = Self {
            max_retries,
            initial_backoff,
            max_backoff: Duration::from_millis(DEFAULT_MAX_BACKOFF_MS),
            backoff_multiplier: BACKOFF_MULTIPLIER,
        };
        policy.max_backoff = policy.max_backoff.max(policy.final_delay());
        policy
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(0, Duration::from_millis(DEFAULT_INTERACTIVE_INITIAL_BACKOFF_MS))
    }

    /// Delay before retry number `retry` (zero-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = (self.backoff_multiplier as f64).powi(retry as i32);
        let max_ms = self.max_backoff.as_millis() as f64;
        let ms = (self.initial_backoff.as_millis() as f64 * factor).min(max_ms);
        Duration::from_millis(ms as u64)
    }

    /// Uncapped doubled delay before the last permitted retry.
    fn final_delay(&self) -> Duration {
        let doublings = self.max_retries.saturating_sub(1).min(63);
        let ms = (self.initial_backoff.as_millis() as u64).saturating_mul(1u64 << doublings);
        Duration::from_millis(ms)
    }

    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if self.max_retries > MAX_ALLOWED_RETRIES {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.max_retries", field),
                value: self.max_retries.to_string(),
                reason: format!("must be at most {}", MAX_ALLOWED_RETRIES),
            });
        }
        if self.initial_backoff.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.initial_backoff_ms", field),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.max_backoff < self.initial_backoff {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.max_backoff_ms", field),
                value: self.max_backoff.as_millis().to_string(),
                reason: "must not be below initial_backoff_ms".to_string(),
            });
        }
        if self.backoff_multiplier != BACKOFF_MULTIPLIER {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.backoff_multiplier", field),
                value: self.backoff_multiplier.to_string(),
                reason: format!("backoff must double, expected {}", BACKOFF_MULTIPLIER),
            });
        }
        if self.max_retries > 0 && self.max_backoff < self.final_delay() {
            return Err(ConfigError::InvalidValue {
                field: format!("{}.max_backoff_ms", field),
                value: self.max_backoff.as_millis().to_string(),
                reason: format!(
                    "caps the doubling before retry {}; needs at least {}ms",
                    self.max_retries,
                    self.final_delay().as_millis()
                ),
            });
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

// ============================================================================
// MODEL
// ============================================================================

/// Generative model endpoint settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Model used for grounded search calls
    pub scout_model: String,
    /// Model used for formatting and structured output
    pub format_model: String,
    #[serde(rename = "request_timeout_ms", with = "duration_ms")]
    pub request_timeout: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            scout_model: DEFAULT_SCOUT_MODEL.to_string(),
            format_model: DEFAULT_FORMAT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("scout_model", &self.scout_model)
            .field("format_model", &self.format_model)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

// ============================================================================
// CACHE / COOLDOWN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Prefix applied to every cache key in the session store
    pub key_prefix: String,
    #[serde(rename = "pulse_ttl_ms", with = "duration_ms")]
    pub pulse_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            pulse_ttl: Duration::from_secs(DEFAULT_PULSE_TTL_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    #[serde(rename = "window_ms", with = "duration_ms")]
    pub window: Duration,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(DEFAULT_COOLDOWN_SECS),
        }
    }
}

// ============================================================================
// MASTER CONFIG
// ============================================================================

/// Master configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NexusConfig {
    pub model: ModelConfig,
    pub interactive_retry: RetryConfig,
    pub background_retry: RetryConfig,
    pub cache: CacheConfig,
    pub cooldown: CooldownConfig,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            interactive_retry: RetryConfig::interactive(),
            background_retry: RetryConfig::background(),
            cache: CacheConfig::default(),
            cooldown: CooldownConfig::default(),
        }
    }
}

impl NexusConfig {
    /// Parse a TOML document; missing sections take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })
    }

    /// Defaults overlaid with `NEXUS_*` environment variables.
    ///
    /// # Environment Variables
    /// - `NEXUS_API_KEY`: generative model API key
    /// - `NEXUS_BASE_URL`: API base URL
    /// - `NEXUS_SCOUT_MODEL` / `NEXUS_FORMAT_MODEL`: model ids
    /// - `NEXUS_REQUEST_TIMEOUT_SECS`: HTTP timeout (default: 30)
    /// - `NEXUS_PULSE_TTL_SECS`: trending feed cache TTL (default: 900)
    /// - `NEXUS_COOLDOWN_SECS`: rate-limit cooldown window (default: 60)
    /// - `NEXUS_MAX_RETRIES`: interactive retry count (default: 3)
    /// - `NEXUS_INITIAL_BACKOFF_MS`: interactive first delay (default: 1000)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load an optional TOML file, apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> NexusResult<Self> {
        let mut config = match path {
            Some(path) => {
                let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
                    reason: format!("{}: {}", path.display(), e),
                })?;
                Self::from_toml_str(&source)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from `lookup`; unparsable numbers are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.model.api_key = Some(key);
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.model.base_url = url;
        }
        if let Some(model) = lookup(ENV_SCOUT_MODEL) {
            self.model.scout_model = model;
        }
        if let Some(model) = lookup(ENV_FORMAT_MODEL) {
            self.model.format_model = model;
        }
        if let Some(secs) = number(ENV_REQUEST_TIMEOUT_SECS) {
            self.model.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = number(ENV_PULSE_TTL_SECS) {
            self.cache.pulse_ttl = Duration::from_secs(secs);
        }
        if let Some(secs) = number(ENV_COOLDOWN_SECS) {
            self.cooldown.window = Duration::from_secs(secs);
        }
        if let Some(retries) = number(ENV_MAX_RETRIES) {
            self.interactive_retry.max_retries = retries.min(u32::MAX as u64) as u32;
        }
        if let Some(ms) = number(ENV_INITIAL_BACKOFF_MS) {
            self.interactive_retry.initial_backoff = Duration::from_millis(ms);
        }
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - both retry policies
    /// - non-empty base URL and model ids, positive request timeout
    /// - positive pulse TTL and cooldown window, non-empty key prefix
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.interactive_retry.validate("interactive_retry")?;
        self.background_retry.validate("background_retry")?;

        for (field, value) in [
            ("model.base_url", &self.model.base_url),
            ("model.scout_model", &self.model.scout_model),
            ("model.format_model", &self.model.format_model),
            ("cache.key_prefix", &self.cache.key_prefix),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingRequired {
                    field: field.to_string(),
                });
            }
        }

        for (field, value) in [
            ("model.request_timeout_ms", self.model.request_timeout),
            ("cache.pulse_ttl_ms", self.cache.pulse_ttl),
            ("cooldown.window_ms", self.cooldown.window),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: "0".to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        }

        Ok(())
    }
}
