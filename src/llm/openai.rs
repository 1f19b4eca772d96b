//! OpenAI-compatible chat completions client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::client::{GenerationError, TextGenerator};
use super::types::{FinishReason, GenerationRequest, GenerationResponse};

/// Chat completions endpoint
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Default model to use
const DEFAULT_MODEL: &str = "gpt-4o-mini-2024-07-18";

/// Environment variable holding the API key
const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Configuration for the OpenAI client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub model: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl OpenAiConfig {
    /// Create a new config with a specific model
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }
}

/// OpenAI API client
pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
}

impl OpenAiGenerator {
    /// Create a new client
    ///
    /// Reads OPENAI_API_KEY from environment
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var(API_KEY_VAR).map_err(|_| GenerationError::MissingApiKey {
            env_var: API_KEY_VAR.to_string(),
        })?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: OpenAiConfig) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Build the request body for the chat completions API
    fn build_request(&self, request: &GenerationRequest) -> Value {
        json!({
            "model": self.config.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": [
                { "role": "user", "content": request.prompt }
            ]
        })
    }

    /// Parse a chat completions response body
    fn parse_response(&self, body: &Value) -> Result<GenerationResponse, GenerationError> {
        let choice = body["choices"]
            .get(0)
            .ok_or_else(|| GenerationError::InvalidResponse("no choices in response".to_string()))?;

        let text = choice["message"]["content"]
            .as_str()
            .ok_or_else(|| GenerationError::InvalidResponse("missing message content".to_string()))?
            .to_string();

        let finish_reason = match choice["finish_reason"].as_str() {
            Some("length") => FinishReason::Length,
            _ => FinishReason::Stop,
        };

        let tokens_used = body["usage"]["total_tokens"].as_u64().unwrap_or(0);

        Ok(GenerationResponse {
            text,
            tokens_used,
            finish_reason,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        let body = self.build_request(&request);

        let response = self
            .client
            .post(OPENAI_API_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.config.timeout)
                } else {
                    GenerationError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await?;
        self.parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OpenAiGenerator {
        OpenAiGenerator::with_api_key("sk-test".to_string(), OpenAiConfig::default()).unwrap()
    }

    #[test]
    fn test_build_request() {
        let client = test_client();
        let request = GenerationRequest::new("What is the capital of France?")
            .with_max_tokens(1000)
            .with_temperature(0.5);

        let body = client.build_request(&request);

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 1000);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(
            body["messages"][0]["content"],
            "What is the capital of France?"
        );
    }

    #[test]
    fn test_parse_response_stop() {
        let client = test_client();
        let body = json!({
            "choices": [{
                "message": { "content": "Paris is the capital of France." },
                "finish_reason": "stop"
            }],
            "usage": { "total_tokens": 42 }
        });

        let response = client.parse_response(&body).unwrap();
        assert_eq!(response.text, "Paris is the capital of France.");
        assert_eq!(response.tokens_used, 42);
        assert_eq!(response.finish_reason, FinishReason::Stop);
    }

    #[test]
    fn test_parse_response_length() {
        let client = test_client();
        let body = json!({
            "choices": [{
                "message": { "content": "A very long answer" },
                "finish_reason": "length"
            }],
            "usage": { "total_tokens": 1000 }
        });

        let response = client.parse_response(&body).unwrap();
        assert_eq!(response.finish_reason, FinishReason::Length);
        assert!(response.answer().ends_with("... ..."));
    }

    #[test]
    fn test_parse_response_no_choices() {
        let client = test_client();
        let body = json!({ "choices": [] });

        let result = client.parse_response(&body);
        assert!(matches!(result, Err(GenerationError::InvalidResponse(_))));
    }

    #[test]
    fn test_missing_api_key() {
        // Only meaningful when the variable is actually absent
        if std::env::var(API_KEY_VAR).is_err() {
            let result = OpenAiGenerator::new(OpenAiConfig::default());
            assert!(matches!(
                result,
                Err(GenerationError::MissingApiKey { .. })
            ));
        }
    }

    #[test]
    fn test_config_with_model() {
        let config = OpenAiConfig::with_model("gpt-4o");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }
}
