//! Nexus LLM - Generative Model Boundary
//!
//! Provider-agnostic trait for free-text and structured generation, the
//! rate-limit retry wrapper, and the Gemini REST provider.

use async_trait::async_trait;
use nexus_core::{GroundingSource, NexusResult};
use serde_json::Value;

pub mod providers;
pub mod retry;
pub mod structured;

pub use providers::{GeminiClient, GeminiModel};
pub use retry::{call_with_retry, RetryingCaller};
pub use structured::{parse_structured, schema};

// ============================================================================
// REQUESTS
// ============================================================================

/// Free-text generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// Ground the answer in live web search results
    pub web_search: bool,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_instruction: None,
            web_search: false,
        }
    }

    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_web_search(mut self) -> Self {
        self.web_search = true;
        self
    }
}

/// JSON-mode generation request. `schema` constrains the output shape when set.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub model: String,
    pub prompt: String,
    pub schema: Option<Value>,
}

impl StructuredRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

// ============================================================================
// RESPONSES
// ============================================================================

/// A web citation attached to a grounded answer. The title may be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub title: Option<String>,
    pub uri: String,
}

impl Citation {
    pub fn new(title: Option<String>, uri: impl Into<String>) -> Self {
        Self {
            title,
            uri: uri.into(),
        }
    }

    /// Convert, substituting `fallback_title` for a missing or blank title.
    pub fn into_source(self, fallback_title: &str) -> GroundingSource {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| fallback_title.to_string());
        GroundingSource::new(title, self.uri)
    }
}

/// Free-text generation output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    /// Concatenated text parts; empty when the model returned nothing
    pub text: String,
    pub citations: Vec<Citation>,
}

impl Generation {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            citations: Vec::new(),
        }
    }

    pub fn with_citation(mut self, citation: Citation) -> Self {
        self.citations.push(citation);
        self
    }

    /// Citations as grounding sources with a title fallback.
    pub fn sources(&self, fallback_title: &str) -> Vec<GroundingSource> {
        self.citations
            .iter()
            .cloned()
            .map(|c| c.into_source(fallback_title))
            .collect()
    }
}

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// A generative model endpoint.
/// Implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Generate free text, optionally grounded in web search.
    async fn generate(&self, request: &GenerateRequest) -> NexusResult<Generation>;

    /// Generate raw JSON text. Parsing is the caller's job, see
    /// [`parse_structured`].
    async fn generate_structured(&self, request: &StructuredRequest) -> NexusResult<String>;

    /// Provider name used in errors and logs.
    fn provider_name(&self) -> &str;
}
