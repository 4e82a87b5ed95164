//! Google Gemini provider implementation
//!
//! Free-text and JSON-mode generation through the `generateContent` REST
//! endpoint, with optional Google Search grounding.

pub mod client;
pub mod model;
pub mod types;

pub use client::GeminiClient;
pub use model::GeminiModel;
