//! Completion provider trait — the abstraction over the hosted text
//! completion service.
//!
//! A provider takes a fully assembled prompt plus sampling options and
//! returns the first candidate's text. Credentials live inside the provider
//! instance; callers never pass them per request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;
use crate::persona::Persona;

/// Model identifiers offered by the model selector.
pub const SUPPORTED_MODELS: &[&str] = &[
    "j1-jumbo",
    "experimental/j1-grande-instruct",
    "j1-grande",
    "j1-large",
];

/// Literal token separating few-shot examples; also used as a stop sequence.
pub const DEFAULT_SEPARATOR: &str = "##";

/// Sampling options, named as the completion API expects them on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingConfig {
    /// Number of candidates to request. Parley only ever reads the first.
    pub num_results: u32,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_k_return: u32,
    pub top_p: f32,
    pub stop_sequences: Vec<String>,
}

impl SamplingConfig {
    /// Stop generation before the model invents the next turn: on either
    /// speaker label or the example separator.
    pub fn turn_stops(persona: &Persona, separator: &str) -> Vec<String> {
        vec![
            format!("{}:", persona.bot_name),
            format!("{}:", persona.user_name),
            separator.to_string(),
        ]
    }

    /// Default sampling for a chat with the given persona.
    pub fn for_persona(persona: &Persona) -> Self {
        Self {
            stop_sequences: Self::turn_stops(persona, DEFAULT_SEPARATOR),
            ..Self::default()
        }
    }
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            num_results: 1,
            max_tokens: 50,
            temperature: 0.8,
            top_k_return: 0,
            top_p: 0.9,
            stop_sequences: Vec::new(),
        }
    }
}

/// One call to the completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub config: SamplingConfig,
}

/// The first candidate returned by the service, already trimmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub text: String,

    /// Which model produced the text
    pub model: String,

    /// Why generation stopped, when the service reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Every completion backend implements this trait.
///
/// Implementations must surface transport, authentication and payload
/// failures as errors and must not retry.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// A human-readable name for this provider (e.g. "ai21").
    fn name(&self) -> &str;

    /// Send the prompt and return the first candidate.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, CompletionError>;
}
