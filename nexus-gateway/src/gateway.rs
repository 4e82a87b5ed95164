//! Intelligence gateway
//!
//! Every public operation returns a value, never an error. Failures are
//! classified and degraded per operation: user-initiated calls surface a
//! canned message, the background trending feed goes quiet and trips a
//! cooldown on rate limits.

use std::sync::Arc;
use std::time::Duration;

use nexus_core::constants::{
    BOOK_SUGGESTION_LIMIT, PULSE_CACHE_KEY, PULSE_COOLDOWN_KEY, PULSE_DEAL_COUNT,
};
use nexus_core::{
    new_request_id, AiResult, Category, Clock, NexusConfig, NexusResult, PlacementMode,
    SafetyVerdict, SystemClock, TrendingItem,
};
use nexus_llm::{
    parse_structured, schema, GeminiModel, GenerateRequest, Generation, GenerativeModel,
    RetryingCaller, StructuredRequest,
};
use nexus_storage::{FailureCooldown, Freshness, KeyValueStore, ResponseCache, SessionStore};
use tracing::Instrument;

use crate::prompts;
use crate::pulse::PulseDeal;

/// Domain facade over the generative model.
pub struct IntelligenceGateway {
    model: Arc<dyn GenerativeModel>,
    cache: ResponseCache,
    cooldown: FailureCooldown,
    interactive: RetryingCaller,
    background: RetryingCaller,
    scout_model: String,
    format_model: String,
    pulse_ttl: Duration,
}

impl IntelligenceGateway {
    /// Assemble from an explicit cache and cooldown.
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        config: &NexusConfig,
        cache: ResponseCache,
        cooldown: FailureCooldown,
    ) -> Self {
        Self {
            model,
            cache,
            cooldown,
            interactive: RetryingCaller::new(config.interactive_retry.clone()),
            background: RetryingCaller::new(config.background_retry.clone()),
            scout_model: config.model.scout_model.clone(),
            format_model: config.model.format_model.clone(),
            pulse_ttl: config.cache.pulse_ttl,
        }
    }

    /// Build cache and cooldown over one session store and clock.
    pub fn with_session(
        model: Arc<dyn GenerativeModel>,
        config: &NexusConfig,
        session: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let cache = ResponseCache::new(session.clone(), clock.clone(), config.cache.key_prefix.clone());
        let cooldown = FailureCooldown::new(
            session,
            clock,
            format!("{}:{}", config.cache.key_prefix, PULSE_COOLDOWN_KEY),
            config.cooldown.window,
        );
        Self::new(model, config, cache, cooldown)
    }

    /// Production wiring: Gemini, a fresh session store, the system clock.
    pub fn connect(config: &NexusConfig) -> NexusResult<Self> {
        config.validate()?;
        let model = Arc::new(GeminiModel::from_config(&config.model)?);
        Ok(Self::with_session(
            model,
            config,
            Arc::new(SessionStore::new()),
            Arc::new(SystemClock),
        ))
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn cooldown(&self) -> &FailureCooldown {
        &self.cooldown
    }

    async fn generate(
        &self,
        caller: &RetryingCaller,
        operation: &str,
        request: &GenerateRequest,
    ) -> NexusResult<Generation> {
        let model = self.model.as_ref();
        caller.call(operation, move || model.generate(request)).await
    }

    async fn generate_structured(
        &self,
        caller: &RetryingCaller,
        operation: &str,
        request: &StructuredRequest,
    ) -> NexusResult<String> {
        let model = self.model.as_ref();
        caller
            .call(operation, move || model.generate_structured(request))
            .await
    }

    // ========================================================================
    // DEEP SCAN
    // ========================================================================

    /// Grounded search followed by a Markdown formatting pass.
    pub async fn deep_scan(&self, query: &str) -> AiResult {
        let query = query.trim();
        if query.is_empty() {
            return AiResult::error(prompts::SCAN_BLANK_QUERY);
        }

        let span = tracing::info_span!("deep_scan", request_id = %new_request_id());
        async {
            match self.run_deep_scan(query).await {
                Ok(result) => result,
                Err(e) => {
                    tracing::warn!(error = %e, class = ?e.class(), "Deep scan failed");
                    AiResult::error(if e.is_rate_limited() {
                        prompts::SCAN_RATE_LIMITED
                    } else {
                        prompts::SCAN_INTERRUPTED
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_deep_scan(&self, query: &str) -> NexusResult<AiResult> {
        let scout_request =
            GenerateRequest::new(&self.scout_model, prompts::deep_scan(query)).with_web_search();
        let scout = self
            .generate(&self.interactive, "deep_scan.scout", &scout_request)
            .await?;

        let format_request = GenerateRequest::new(&self.format_model, prompts::format_scan(&scout.text))
            .with_system(prompts::FORMATTER_SYSTEM);
        let formatted = self
            .generate(&self.interactive, "deep_scan.format", &format_request)
            .await?;

        let sources = scout.sources(prompts::RETAILER_SOURCE);
        tracing::debug!(sources = sources.len(), "Deep scan complete");
        Ok(
            AiResult::success(non_empty_or(formatted.text, prompts::SCAN_EMPTY), sources)
                .with_verifier(&self.format_model),
        )
    }

    // ========================================================================
    // PRICE COMPARISON
    // ========================================================================

    /// Markdown price table across the big retailers. Blank query yields "".
    pub async fn price_comparison(&self, query: &str) -> String {
        let query = query.trim();
        if query.is_empty() {
            return String::new();
        }

        let span = tracing::info_span!("price_comparison", request_id = %new_request_id());
        async {
            let request = GenerateRequest::new(&self.format_model, prompts::price_comparison(query))
                .with_system(prompts::ANALYST_SYSTEM)
                .with_web_search();
            match self.generate(&self.interactive, "price_comparison", &request).await {
                Ok(generation) => non_empty_or(generation.text, prompts::PRICE_EMPTY),
                Err(e) => {
                    tracing::warn!(error = %e, class = ?e.class(), "Price comparison failed");
                    prompts::PRICE_FAILED.to_string()
                }
            }
        }
        .instrument(span)
        .await
    }

    // ========================================================================
    // PLACEMENT
    // ========================================================================

    /// Strategic advice, appeal letter or availability search for a province.
    pub async fn placement_advice(
        &self,
        province: &str,
        status: &str,
        mode: PlacementMode,
        context: &str,
    ) -> AiResult {
        let province = province.trim();
        if province.is_empty() {
            return AiResult::error(prompts::PLACEMENT_BLANK_PROVINCE);
        }

        let span = tracing::info_span!("placement_advice", request_id = %new_request_id(), ?mode);
        async {
            let request = GenerateRequest::new(
                &self.format_model,
                prompts::placement(province, status.trim(), mode, context.trim()),
            )
            .with_system(prompts::ADVOCATE_SYSTEM)
            .with_web_search();

            match self.generate(&self.interactive, "placement_advice", &request).await {
                Ok(generation) => {
                    let sources = generation.sources(prompts::DEPARTMENT_SOURCE);
                    AiResult::success(non_empty_or(generation.text, prompts::PLACEMENT_EMPTY), sources)
                }
                Err(e) => {
                    tracing::warn!(error = %e, class = ?e.class(), "Placement advice failed");
                    AiResult::error(if e.is_rate_limited() {
                        prompts::PLACEMENT_RATE_LIMITED
                    } else {
                        prompts::PLACEMENT_INTERRUPTED
                    })
                }
            }
        }
        .instrument(span)
        .await
    }

    // ========================================================================
    // MARKETPLACE
    // ========================================================================

    /// Up to five textbook titles related to `title`; empty on any failure.
    pub async fn book_suggestions(&self, title: &str) -> Vec<String> {
        let title = title.trim();
        if title.is_empty() {
            return Vec::new();
        }

        let span = tracing::info_span!("book_suggestions", request_id = %new_request_id());
        async {
            let request = StructuredRequest::new(&self.format_model, prompts::book_suggestions(title))
                .with_schema(schema::string_array());
            let parsed = self
                .generate_structured(&self.interactive, "book_suggestions", &request)
                .await
                .and_then(|raw| {
                    if raw.trim().is_empty() {
                        Ok(Vec::new())
                    } else {
                        parse_structured::<Vec<String>>(self.model.provider_name(), &raw)
                    }
                });

            match parsed {
                Ok(titles) => titles
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .take(BOOK_SUGGESTION_LIMIT)
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, class = ?e.class(), "Book suggestions unavailable");
                    Vec::new()
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Screen a listing. Fails open: any failure yields a permissive verdict.
    pub async fn listing_safety_check(&self, title: &str, category: Category) -> SafetyVerdict {
        let title = title.trim();
        if title.is_empty() {
            return SafetyVerdict::permissive();
        }

        let span = tracing::info_span!("listing_safety_check", request_id = %new_request_id(), %category);
        async {
            let request = StructuredRequest::new(&self.format_model, prompts::safety_check(title, category))
                .with_schema(schema::safety_verdict());
            let verdict = self
                .generate_structured(&self.interactive, "listing_safety_check", &request)
                .await
                .and_then(|raw| {
                    if raw.trim().is_empty() {
                        Ok(SafetyVerdict::permissive())
                    } else {
                        parse_structured::<SafetyVerdict>(self.model.provider_name(), &raw)
                    }
                });

            match verdict {
                Ok(verdict) => {
                    if !verdict.safe {
                        tracing::info!(reason = ?verdict.reason, "Listing flagged");
                    }
                    verdict
                }
                Err(e) => {
                    tracing::warn!(error = %e, class = ?e.class(), "Safety check failed open");
                    SafetyVerdict::permissive()
                }
            }
        }
        .instrument(span)
        .await
    }

    // ========================================================================
    // PULSE
    // ========================================================================

    /// Live back-to-school deals, cached per session.
    ///
    /// Order: cache, cooldown, network. A rate-limited fetch trips the
    /// cooldown; any failure yields an empty feed and nothing is cached.
    pub async fn fetch_pulse(&self) -> Vec<TrendingItem> {
        let span = tracing::info_span!("fetch_pulse", request_id = %new_request_id());
        async {
            if let Some(read) = self
                .cache
                .get::<Vec<TrendingItem>>(PULSE_CACHE_KEY, Freshness::best_effort(self.pulse_ttl))
            {
                tracing::debug!(staleness_ms = read.staleness().as_millis() as u64, "Serving cached pulse");
                return read.into_value();
            }

            if let Some(remaining) = self.cooldown.remaining() {
                tracing::info!(remaining_ms = remaining.as_millis() as u64, "Pulse cooldown active, skipping fetch");
                return Vec::new();
            }

            match self.run_pulse().await {
                Ok(items) => {
                    if let Err(e) = self.cache.put(PULSE_CACHE_KEY, &items) {
                        tracing::warn!(error = %e, "Failed to cache pulse");
                    }
                    items
                }
                Err(e) if e.is_rate_limited() => {
                    tracing::warn!(error = %e, "Pulse rate limited, entering cooldown");
                    if let Err(trip_err) = self.cooldown.trip() {
                        tracing::warn!(error = %trip_err, "Failed to record cooldown");
                    }
                    Vec::new()
                }
                Err(e) => {
                    tracing::error!(error = %e, class = ?e.class(), "Pulse fetch failed");
                    Vec::new()
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run_pulse(&self) -> NexusResult<Vec<TrendingItem>> {
        let scout_request =
            GenerateRequest::new(&self.scout_model, prompts::pulse_scout()).with_web_search();
        let scout = self
            .generate(&self.background, "pulse.scout", &scout_request)
            .await?;

        let structure_request =
            StructuredRequest::new(&self.format_model, prompts::pulse_structure(&scout.text));
        let raw = self
            .generate_structured(&self.background, "pulse.structure", &structure_request)
            .await?;

        let deals: Vec<PulseDeal> = if raw.trim().is_empty() {
            Vec::new()
        } else {
            parse_structured(self.model.provider_name(), &raw)?
        };

        Ok(deals
            .into_iter()
            .take(PULSE_DEAL_COUNT)
            .enumerate()
            .map(|(i, deal)| deal.into_item(i))
            .collect())
    }
}

impl std::fmt::Debug for IntelligenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntelligenceGateway")
            .field("provider", &self.model.provider_name())
            .field("scout_model", &self.scout_model)
            .field("format_model", &self.format_model)
            .field("pulse_ttl", &self.pulse_ttl)
            .finish()
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_or() {
        assert_eq!(non_empty_or("  ".to_string(), "fallback"), "fallback");
        assert_eq!(non_empty_or("kept".to_string(), "fallback"), "kept");
    }

    #[test]
    fn test_connect_requires_api_key() {
        let err = IntelligenceGateway::connect(&NexusConfig::default()).expect_err("no key");
        assert!(matches!(
            err,
            nexus_core::NexusError::Llm(nexus_core::LlmError::ProviderNotConfigured)
        ));
    }
}
