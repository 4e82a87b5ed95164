//! [`GenerativeModel`] implementation over the Gemini REST API

use super::client::{GeminiClient, PROVIDER};
use super::types::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Tool,
};
use crate::{Citation, GenerateRequest, Generation, GenerativeModel, StructuredRequest};
use async_trait::async_trait;
use nexus_core::{ModelConfig, NexusResult};

/// Gemini-backed generative model.
#[derive(Debug)]
pub struct GeminiModel {
    client: GeminiClient,
}

impl GeminiModel {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ModelConfig) -> NexusResult<Self> {
        Ok(Self::new(GeminiClient::new(config)?))
    }
}

pub(crate) fn build_generate_body(request: &GenerateRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(&request.prompt)],
        system_instruction: request.system_instruction.as_deref().map(Content::bare),
        tools: if request.web_search {
            vec![Tool::google_search()]
        } else {
            Vec::new()
        },
        generation_config: None,
    }
}

pub(crate) fn build_structured_body(request: &StructuredRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(&request.prompt)],
        system_instruction: None,
        tools: Vec::new(),
        generation_config: Some(GenerationConfig::json(request.schema.clone())),
    }
}

/// Text parts of the first candidate, concatenated.
pub(crate) fn response_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|c| c.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|p| p.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

/// Web citations of the first candidate; chunks without a URI are skipped.
pub(crate) fn response_citations(response: &GenerateContentResponse) -> Vec<Citation> {
    response
        .candidates
        .first()
        .and_then(|c| c.grounding_metadata.as_ref())
        .map(|meta| {
            meta.grounding_chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .filter_map(|web| {
                    let uri = web.uri.clone()?;
                    Some(Citation::new(web.title.clone(), uri))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, request: &GenerateRequest) -> NexusResult<Generation> {
        let body = build_generate_body(request);
        let response = self.client.generate_content(&request.model, &body).await?;
        Ok(Generation {
            text: response_text(&response),
            citations: response_citations(&response),
        })
    }

    async fn generate_structured(&self, request: &StructuredRequest) -> NexusResult<String> {
        let body = build_structured_body(request);
        let response = self.client.generate_content(&request.model, &body).await?;
        Ok(response_text(&response))
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use serde_json::json;

    #[test]
    fn test_grounded_request_wire_shape() {
        let request = GenerateRequest::new("gemini-3-pro-preview", "find calculators")
            .with_system("be a retail analyst")
            .with_web_search();
        let wire = serde_json::to_value(build_generate_body(&request)).expect("serialize");

        assert_eq!(
            wire,
            json!({
                "contents": [{ "role": "user", "parts": [{ "text": "find calculators" }] }],
                "systemInstruction": { "parts": [{ "text": "be a retail analyst" }] },
                "tools": [{ "googleSearch": {} }]
            })
        );
    }

    #[test]
    fn test_structured_request_wire_shape() {
        let request =
            StructuredRequest::new("gemini-3-flash-preview", "list").with_schema(schema::string_array());
        let wire = serde_json::to_value(build_structured_body(&request)).expect("serialize");

        assert_eq!(wire["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(wire["generationConfig"]["responseSchema"]["type"], "ARRAY");
        assert!(wire.get("tools").is_none());
        assert!(wire.get("systemInstruction").is_none());
    }

    #[test]
    fn test_schemaless_structured_omits_schema() {
        let wire = serde_json::to_value(build_structured_body(&StructuredRequest::new("m", "p")))
            .expect("serialize");
        assert!(wire["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_extracts_text_and_citations() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "| Store | Price |\n" }, { "text": "| PEP | R99 |" }] },
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://takealot.com/x", "title": "takealot.com" } },
                        { "web": { "uri": "https://pep.co.za/y" } },
                        { "retrievedContext": { "uri": "ignored" } },
                        { "web": { "title": "no uri" } }
                    ]
                }
            }]
        }))
        .expect("parse");

        assert_eq!(response_text(&response), "| Store | Price |\n| PEP | R99 |");
        let citations = response_citations(&response);
        assert_eq!(
            citations,
            vec![
                Citation::new(Some("takealot.com".to_string()), "https://takealot.com/x"),
                Citation::new(None, "https://pep.co.za/y"),
            ]
        );
    }

    #[test]
    fn test_empty_candidates_yield_empty_text() {
        let response: GenerateContentResponse =
            serde_json::from_value(json!({ "promptFeedback": {} })).expect("parse");
        assert_eq!(response_text(&response), "");
        assert!(response_citations(&response).is_empty());
    }
}
