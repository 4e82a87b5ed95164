//! Constants for Nexus
//!
//! Default values, storage keys and environment variable names.

// ============================================================================
// GENERATIVE MODEL
// ============================================================================

/// Gemini REST API base URL
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used for grounded web-search calls
pub const DEFAULT_SCOUT_MODEL: &str = "gemini-3-pro-preview";

/// Model used for formatting and structured-output calls
pub const DEFAULT_FORMAT_MODEL: &str = "gemini-3-flash-preview";

/// Default per-request HTTP timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// RETRY
// ============================================================================

/// Retries for user-initiated calls
pub const DEFAULT_INTERACTIVE_MAX_RETRIES: u32 = 3;

/// First backoff delay for user-initiated calls (ms)
pub const DEFAULT_INTERACTIVE_INITIAL_BACKOFF_MS: u64 = 1_000;

/// Retries for background feed calls
pub const DEFAULT_BACKGROUND_MAX_RETRIES: u32 = 2;

/// First backoff delay for background feed calls (ms)
pub const DEFAULT_BACKGROUND_INITIAL_BACKOFF_MS: u64 = 3_000;

/// Backoff growth per retry; delays double
pub const BACKOFF_MULTIPLIER: f32 = 2.0;

/// Default upper bound on any single backoff delay (ms)
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 60_000;

/// Hard ceiling on configured retries
pub const MAX_ALLOWED_RETRIES: u32 = 10;

// ============================================================================
// CACHE / COOLDOWN
// ============================================================================

/// Prefix for every session-store key written by the cache layer
pub const DEFAULT_CACHE_PREFIX: &str = "nexus";

/// Trending feed cache key
pub const PULSE_CACHE_KEY: &str = "nexus_pulse_cache";

/// Trending feed cache TTL in seconds (15 minutes)
pub const DEFAULT_PULSE_TTL_SECS: u64 = 15 * 60;

/// Trending feed cooldown marker key
pub const PULSE_COOLDOWN_KEY: &str = "nexus_pulse_cooldown";

/// Cooldown window after a rate-limited feed fetch, in seconds
pub const DEFAULT_COOLDOWN_SECS: u64 = 60;

// ============================================================================
// DURABLE STORAGE
// ============================================================================

/// Namespace key for the budget ledger
pub const BUDGET_STORAGE_KEY: &str = "skoolswap_budget";

/// Default LMDB map size in megabytes
pub const DEFAULT_DURABLE_MAP_SIZE_MB: usize = 16;

// ============================================================================
// GATEWAY SHAPING
// ============================================================================

/// Maximum number of book titles returned by a suggestion request
pub const BOOK_SUGGESTION_LIMIT: usize = 5;

/// Number of deals requested for the trending feed
pub const PULSE_DEAL_COUNT: usize = 4;

// ============================================================================
// ENVIRONMENT
// ============================================================================

pub const ENV_API_KEY: &str = "NEXUS_API_KEY";
pub const ENV_BASE_URL: &str = "NEXUS_BASE_URL";
pub const ENV_SCOUT_MODEL: &str = "NEXUS_SCOUT_MODEL";
pub const ENV_FORMAT_MODEL: &str = "NEXUS_FORMAT_MODEL";
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "NEXUS_REQUEST_TIMEOUT_SECS";
pub const ENV_PULSE_TTL_SECS: &str = "NEXUS_PULSE_TTL_SECS";
pub const ENV_COOLDOWN_SECS: &str = "NEXUS_COOLDOWN_SECS";
pub const ENV_MAX_RETRIES: &str = "NEXUS_MAX_RETRIES";
pub const ENV_INITIAL_BACKOFF_MS: &str = "NEXUS_INITIAL_BACKOFF_MS";
