//! Nexus Core - Domain Types
//!
//! Plain data structures shared by every other crate: intelligence results,
//! trending deals, listing verdicts and budget line items, plus the error
//! taxonomy, the clock abstraction and configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub mod clock;
pub mod config;
pub mod constants;
pub mod error;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, CooldownConfig, ModelConfig, NexusConfig, RetryConfig};
pub use error::{
    classify_error, message_indicates_rate_limit, ConfigError, ErrorClass, LlmError, NexusError,
    NexusResult, StorageError, ValidationError,
};

// ============================================================================
// IDENTITY TYPES
// ============================================================================

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Request identifier attached to gateway spans (UUIDv7, time-sortable).
pub type RequestId = Uuid;

/// Generate a new UUIDv7 request id.
pub fn new_request_id() -> RequestId {
    Uuid::now_v7()
}

// ============================================================================
// INTELLIGENCE RESULTS
// ============================================================================

/// A citation returned alongside generated text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

impl GroundingSource {
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// Outcome marker for an [`AiResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultStatus {
    Success,
    Error,
}

/// Shaped result of a user-facing intelligence operation.
///
/// `text` is Markdown-subset output intended for the markup renderer. On
/// failure `status` is [`ResultStatus::Error`], `text` holds a canned
/// user-facing message and `sources` is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiResult {
    pub text: String,
    pub sources: Vec<GroundingSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by: Option<String>,
    pub status: ResultStatus,
}

impl AiResult {
    pub fn success(text: impl Into<String>, sources: Vec<GroundingSource>) -> Self {
        Self {
            text: text.into(),
            sources,
            verified_by: None,
            status: ResultStatus::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
            verified_by: None,
            status: ResultStatus::Error,
        }
    }

    pub fn with_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.verified_by = Some(verifier.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }
}

// ============================================================================
// ENUMS
// ============================================================================

/// Listing / deal category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Textbooks,
    Uniforms,
    Stationery,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Textbooks => "Textbooks",
            Category::Uniforms => "Uniforms",
            Category::Stationery => "Stationery",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "textbooks" => Ok(Category::Textbooks),
            "uniforms" => Ok(Category::Uniforms),
            "stationery" => Ok(Category::Stationery),
            other => Err(ValidationError::InvalidValue {
                field: "category".to_string(),
                reason: format!("unknown category '{}'", other),
            }),
        }
    }
}

/// What kind of placement help the parent is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlacementMode {
    /// Strategic next steps for the current placement status
    Advice,
    /// Draft an appeal letter against a rejection
    Appeal,
    /// Find schools with open waiting lists or late registration
    Availability,
}

// ============================================================================
// STRUCTURED PAYLOADS
// ============================================================================

/// Verdict of the listing safety check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub safe: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SafetyVerdict {
    /// The fail-open verdict: safe, no reason.
    pub fn permissive() -> Self {
        Self {
            safe: true,
            reason: None,
        }
    }
}

impl Default for SafetyVerdict {
    fn default() -> Self {
        Self::permissive()
    }
}

/// A live deal surfaced on the trending feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingItem {
    pub id: String,
    pub title: String,
    pub price: String,
    pub retailer: String,
    pub saving_reason: String,
    pub image_url: String,
    pub url: String,
    pub category: String,
}

/// A user-entered budget line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub id: String,
    pub label: String,
    pub estimated: f64,
    pub actual: f64,
    pub category: String,
}

impl BudgetItem {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        estimated: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            estimated,
            actual: 0.0,
            category: category.into(),
        }
    }

    /// Spend as a percentage of the estimate, clamped to 100.
    pub fn progress(&self) -> f64 {
        if self.estimated <= 0.0 {
            return 0.0;
        }
        ((self.actual / self.estimated) * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_result_constructors() {
        let ok = AiResult::success("hello", vec![GroundingSource::new("A", "https://a.test")])
            .with_verifier("flash");
        assert!(ok.is_success());
        assert_eq!(ok.sources.len(), 1);
        assert_eq!(ok.verified_by.as_deref(), Some("flash"));

        let err = AiResult::error("down");
        assert!(!err.is_success());
        assert!(err.sources.is_empty());
        assert!(err.verified_by.is_none());
    }

    #[test]
    fn test_ai_result_serializes_camel_case() {
        let json = serde_json::to_value(AiResult::success("x", vec![]).with_verifier("v"))
            .expect("serialize");
        assert_eq!(json["verifiedBy"], "v");
        assert_eq!(json["status"], "SUCCESS");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("uniforms".parse::<Category>().ok(), Some(Category::Uniforms));
        assert_eq!(" Textbooks ".parse::<Category>().ok(), Some(Category::Textbooks));
        assert!("shoes".parse::<Category>().is_err());
        assert_eq!(Category::Stationery.to_string(), "Stationery");
    }

    #[test]
    fn test_safety_verdict_reason_optional() {
        let verdict: SafetyVerdict = serde_json::from_str(r#"{"safe": false}"#).expect("parse");
        assert!(!verdict.safe);
        assert!(verdict.reason.is_none());
        assert_eq!(SafetyVerdict::default(), SafetyVerdict::permissive());
    }

    #[test]
    fn test_budget_progress_clamps() {
        let mut item = BudgetItem::new("1", "Uniforms", 1200.0, "Uniform");
        assert_eq!(item.progress(), 0.0);
        item.actual = 600.0;
        assert!((item.progress() - 50.0).abs() < f64::EPSILON);
        item.actual = 5000.0;
        assert_eq!(item.progress(), 100.0);

        let free = BudgetItem::new("2", "Free", 0.0, "Other");
        assert_eq!(free.progress(), 0.0);
    }

    #[test]
    fn test_trending_item_wire_names() {
        let item: TrendingItem = serde_json::from_str(
            r##"{"id":"pulse-0","title":"Shoes","price":"299","retailer":"PEP",
                "savingReason":"Back to school","imageUrl":"x","url":"#","category":"Uniforms"}"##,
        )
        .expect("parse");
        assert_eq!(item.saving_reason, "Back to school");
        assert_eq!(item.url, "#");
        assert_eq!(item.image_url, "x");
    }
}
