//! Nexus Test Utilities
//!
//! Shared test infrastructure for the Nexus workspace:
//! - A scripted generative model that replays canned responses and counts calls
//! - Proptest generators for domain types
//! - Fixtures wiring a gateway-ready session store and manual clock
//! - Tracing initialisation for test output

use async_trait::async_trait;
use nexus_core::{LlmError, NexusError, NexusResult};
use nexus_llm::{Citation, GenerateRequest, Generation, GenerativeModel, StructuredRequest};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, Once};

pub use nexus_core::{Clock, ManualClock};

// ============================================================================
// SCRIPTED MODEL
// ============================================================================

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Generative model that replays queued responses in order.
///
/// Free-text and structured calls have separate queues. An exhausted queue
/// answers with a transport error so a missing script shows up as a
/// degraded result rather than a hang.
#[derive(Debug, Default)]
pub struct ScriptedModel {
    generations: Mutex<VecDeque<NexusResult<Generation>>>,
    structured: Mutex<VecDeque<NexusResult<String>>>,
    generate_requests: Mutex<Vec<GenerateRequest>>,
    structured_requests: Mutex<Vec<StructuredRequest>>,
    generate_calls: AtomicUsize,
    structured_calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_generation(&self, generation: Generation) -> &Self {
        lock(&self.generations).push_back(Ok(generation));
        self
    }

    pub fn push_text(&self, text: &str) -> &Self {
        self.push_generation(Generation::text(text))
    }

    pub fn push_generate_error(&self, err: NexusError) -> &Self {
        lock(&self.generations).push_back(Err(err));
        self
    }

    pub fn push_json(&self, raw: &str) -> &Self {
        lock(&self.structured).push_back(Ok(raw.to_string()));
        self
    }

    pub fn push_structured_error(&self, err: NexusError) -> &Self {
        lock(&self.structured).push_back(Err(err));
        self
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn structured_calls(&self) -> usize {
        self.structured_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.generate_calls() + self.structured_calls()
    }

    pub fn generate_requests(&self) -> Vec<GenerateRequest> {
        lock(&self.generate_requests).clone()
    }

    pub fn structured_requests(&self) -> Vec<StructuredRequest> {
        lock(&self.structured_requests).clone()
    }
}

fn exhausted() -> NexusError {
    LlmError::Transport {
        provider: "scripted".to_string(),
        reason: "script exhausted".to_string(),
    }
    .into()
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: &GenerateRequest) -> NexusResult<Generation> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.generate_requests).push(request.clone());
        lock(&self.generations).pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    async fn generate_structured(&self, request: &StructuredRequest) -> NexusResult<String> {
        self.structured_calls.fetch_add(1, Ordering::SeqCst);
        lock(&self.structured_requests).push(request.clone());
        lock(&self.structured).pop_front().unwrap_or_else(|| Err(exhausted()))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// ERROR FIXTURES
// ============================================================================

pub fn rate_limited() -> NexusError {
    LlmError::RateLimited {
        provider: "scripted".to_string(),
        message: "429 RESOURCE_EXHAUSTED".to_string(),
    }
    .into()
}

pub fn signal_lost() -> NexusError {
    LlmError::Transport {
        provider: "scripted".to_string(),
        reason: "connection reset by peer".to_string(),
    }
    .into()
}

/// A grounded generation with one titled citation.
pub fn grounded(text: &str, title: &str, uri: &str) -> Generation {
    Generation::text(text).with_citation(Citation::new(Some(title.to_string()), uri))
}

// ============================================================================
// TRACING
// ============================================================================

static TRACING: Once = Once::new();

/// Install a test-writer fmt subscriber once. Honours `RUST_LOG`.
pub fn init_test_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nexus_gateway=debug,nexus_llm=debug,warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// GENERATORS
// ============================================================================

pub mod generators {
    use nexus_core::{Category, TrendingItem};
    use proptest::prelude::*;

    pub fn arb_category() -> impl Strategy<Value = Category> {
        prop_oneof![
            Just(Category::Textbooks),
            Just(Category::Uniforms),
            Just(Category::Stationery),
        ]
    }

    /// Non-blank free-text search query.
    pub fn arb_query() -> impl Strategy<Value = String> {
        "[A-Za-z0-9][A-Za-z0-9 ]{0,30}"
    }

    /// Whitespace-only input.
    pub fn arb_blank() -> impl Strategy<Value = String> {
        "[ \t\n]{0,6}"
    }

    pub fn arb_trending_item() -> impl Strategy<Value = TrendingItem> {
        (
            0usize..8,
            "[A-Za-z ]{1,20}",
            1u32..5000,
            "[A-Za-z]{2,12}",
            arb_category(),
        )
            .prop_map(|(i, title, price, retailer, category)| TrendingItem {
                id: format!("pulse-{}", i),
                title,
                price: format!("R{}", price),
                retailer,
                saving_reason: "Back to school".to_string(),
                image_url: String::new(),
                url: "#".to_string(),
                category: category.to_string(),
            })
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    use nexus_core::{ManualClock, NexusConfig, RetryConfig};
    use nexus_storage::SessionStore;
    use std::sync::Arc;
    use std::time::Duration;

    /// Config with fast, still-doubling retries.
    pub fn test_config() -> NexusConfig {
        let mut config = NexusConfig::default();
        config.model.api_key = Some("test-key".to_string());
        config.interactive_retry = RetryConfig::new(2, Duration::from_millis(10));
        config.background_retry = RetryConfig::new(1, Duration::from_millis(10));
        config
    }

    pub fn session() -> Arc<SessionStore> {
        Arc::new(SessionStore::new())
    }

    pub fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::starting_now())
    }
}
