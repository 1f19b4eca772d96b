//! Generator trait, error types, and the scripted test double.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::types::{GenerationRequest, GenerationResponse};

/// Stateless text generation client - each call is independent
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Single generation request (blocking until complete)
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, GenerationError>;
}

/// Errors that can occur during generation calls
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Missing API key: environment variable {env_var} not set")]
    MissingApiKey { env_var: String },
}

impl GenerationError {
    /// Whether a transport layer could reasonably retry this call.
    /// The engine itself never retries - runs fail atomically.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Api { status, .. } => *status == 429 || *status >= 500,
            GenerationError::Network(_) => true,
            GenerationError::Timeout(_) => true,
            GenerationError::InvalidResponse(_) => false,
            GenerationError::MissingApiKey { .. } => false,
        }
    }
}

/// Rough token estimation (actual tokenization varies)
/// Roughly 4 bytes per token on average
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}

/// Truncate text to roughly `limit` tokens, keeping the prefix.
/// The cut lands on a char boundary.
pub fn truncate_to_tokens(text: &str, limit: usize) -> String {
    if estimate_tokens(text) <= limit {
        return text.to_string();
    }

    let mut cut = limit * 4;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    text[..cut].to_string()
}

/// Scripted generator for tests: pops canned responses in order and
/// falls back to a fixed response when the script runs dry. Records
/// every prompt it receives.
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<GenerationResponse>>,
    fallback: GenerationResponse,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    /// Create a generator that always answers with the fallback text
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: GenerationResponse::new(fallback, 10),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Queue a scripted text response (10 tokens)
    pub fn push_text(&self, text: impl Into<String>) {
        self.push(GenerationResponse::new(text, 10));
    }

    /// Queue a full scripted response
    pub fn push(&self, response: GenerationResponse) {
        self.script.lock().unwrap().push_back(response);
    }

    /// Number of generate calls made so far
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Copy of every prompt received, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        self.prompts.lock().unwrap().push(request.prompt);
        let next = self.script.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}
