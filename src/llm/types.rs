//! Request and response types for the text generation service.

use serde::{Deserialize, Serialize};

/// Marker appended to an answer when generation stopped on the token limit
pub const TRUNCATION_MARKER: &str = "... ...";

/// A single generation request - everything needed for one call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Fully rendered prompt text
    pub prompt: String,

    /// Max tokens for the response
    pub max_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

impl GenerationRequest {
    /// Create a request with default sampling settings
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_tokens: 1000,
            temperature: 0.5,
        }
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    #[default]
    Stop,
    Length,
}

impl FinishReason {
    /// Check if the response was cut off by the token limit
    pub fn is_truncated(&self) -> bool {
        matches!(self, FinishReason::Length)
    }
}

/// Response from a generation call
#[derive(Debug, Clone, Default)]
pub struct GenerationResponse {
    /// Generated text as returned by the service
    pub text: String,

    /// Total tokens consumed by the call
    pub tokens_used: u64,

    /// Why the model stopped
    pub finish_reason: FinishReason,
}

impl GenerationResponse {
    /// Create a response with the given text and token count
    pub fn new(text: impl Into<String>, tokens_used: u64) -> Self {
        Self {
            text: text.into(),
            tokens_used,
            finish_reason: FinishReason::Stop,
        }
    }

    /// Final answer text, with the truncation marker applied when the
    /// model ran out of tokens.
    pub fn answer(&self) -> String {
        let trimmed = self.text.trim();
        if self.finish_reason.is_truncated() {
            format!("{}{}", trimmed, TRUNCATION_MARKER)
        } else {
            trimmed.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = GenerationRequest::new("hello")
            .with_max_tokens(500)
            .with_temperature(0.3);

        assert_eq!(req.prompt, "hello");
        assert_eq!(req.max_tokens, 500);
        assert!((req.temperature - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_request_defaults() {
        let req = GenerationRequest::new("q");
        assert_eq!(req.max_tokens, 1000);
        assert!((req.temperature - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_finish_reason_serialization() {
        assert_eq!(serde_json::to_string(&FinishReason::Stop).unwrap(), "\"stop\"");
        assert_eq!(serde_json::to_string(&FinishReason::Length).unwrap(), "\"length\"");
    }

    #[test]
    fn test_finish_reason_is_truncated() {
        assert!(!FinishReason::Stop.is_truncated());
        assert!(FinishReason::Length.is_truncated());
    }

    #[test]
    fn test_answer_trims_whitespace() {
        let resp = GenerationResponse::new("  Paris is the capital of France.  \n", 12);
        assert_eq!(resp.answer(), "Paris is the capital of France.");
    }

    #[test]
    fn test_answer_appends_truncation_marker() {
        let resp = GenerationResponse {
            text: "An incomplete answer".to_string(),
            tokens_used: 1000,
            finish_reason: FinishReason::Length,
        };
        assert_eq!(resp.answer(), "An incomplete answer... ...");
    }
}
