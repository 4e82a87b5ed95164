//! Structured (JSON-mode) output helpers.

use nexus_core::{LlmError, NexusResult};
use serde::de::DeserializeOwned;

/// Response schemas in the Gemini OpenAPI subset.
pub mod schema {
    use serde_json::{json, Value};

    /// `string[]`
    pub fn string_array() -> Value {
        json!({
            "type": "ARRAY",
            "items": { "type": "STRING" }
        })
    }

    /// `{ safe: boolean, reason?: string }`
    pub fn safety_verdict() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "safe": { "type": "BOOLEAN" },
                "reason": { "type": "STRING" }
            },
            "required": ["safe"]
        })
    }
}

/// Strip a surrounding Markdown code fence, if any.
fn strip_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Decode model JSON output into `T`.
///
/// Malformed output maps to [`LlmError::InvalidResponse`], which classifies
/// as a parse failure and is never retried.
pub fn parse_structured<T: DeserializeOwned>(provider: &str, raw: &str) -> NexusResult<T> {
    serde_json::from_str(strip_fence(raw)).map_err(|e| {
        LlmError::InvalidResponse {
            provider: provider.to_string(),
            reason: format!("structured output did not match: {}", e),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_core::{ErrorClass, SafetyVerdict};

    #[test]
    fn test_parse_plain_json() {
        let titles: Vec<String> =
            parse_structured("gemini", r#"["Platinum Maths", "Via Afrika"]"#).expect("parse");
        assert_eq!(titles.len(), 2);
    }

    #[test]
    fn test_parse_fenced_json() {
        let verdict: SafetyVerdict =
            parse_structured("gemini", "```json\n{\"safe\": false, \"reason\": \"weapon\"}\n```")
                .expect("parse");
        assert!(!verdict.safe);
        assert_eq!(verdict.reason.as_deref(), Some("weapon"));
    }

    #[test]
    fn test_malformed_is_parse_failure() {
        let err = parse_structured::<Vec<String>>("gemini", "not json").expect_err("malformed");
        assert_eq!(err.class(), ErrorClass::ParseFailure);

        let err = parse_structured::<Vec<String>>("gemini", r#"{"safe": true}"#)
            .expect_err("wrong shape");
        assert_eq!(err.class(), ErrorClass::ParseFailure);
    }

    #[test]
    fn test_schemas_shape() {
        assert_eq!(schema::string_array()["items"]["type"], "STRING");
        assert_eq!(schema::safety_verdict()["required"][0], "safe");
    }
}
