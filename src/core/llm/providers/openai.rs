//! OpenAI-Compatible Provider Implementation
//!
//! Targets the `/v1/chat/completions` endpoint. Also works against other
//! OpenAI-compatible services via the `base_url` override.

use crate::core::llm::provider::{LLMError, LLMProvider, Result};
use crate::core::llm::types::{ChatRequest, ChatResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat completions provider
pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            model,
            base_url: base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string()),
            client,
        }
    }

    fn map_send_error(e: reqwest::Error) -> LLMError {
        if e.is_timeout() {
            LLMError::Timeout
        } else {
            LLMError::HttpError(e)
        }
    }
}

#[async_trait]
impl LLMProvider for OpenAiProvider {
    fn id(&self) -> &str {
        "openai"
    }

    fn name(&self) -> &str {
        "OpenAI"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let mut messages: Vec<serde_json::Value> = Vec::new();

        if let Some(system) = &request.system_prompt {
            messages.push(serde_json::json!({
                "role": "system",
                "content": system
            }));
        }

        for msg in &request.messages {
            messages.push(serde_json::json!({
                "role": msg.role.to_string(),
                "content": msg.content
            }));
        }

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temp) = request.temperature {
            body["temperature"] = serde_json::json!(temp);
        }

        if let Some(max) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max);
        }

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = resp.status();
        let latency = start.elapsed().as_millis() as u64;

        if status.as_u16() == 401 {
            let text = resp.text().await.unwrap_or_default();
            return Err(LLMError::AuthError(text));
        }

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LLMError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let json: serde_json::Value = resp.json().await?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                LLMError::InvalidResponse("Missing choices[0].message.content".to_string())
            })?
            .to_string();

        let usage = json["usage"].as_object().map(|u| TokenUsage {
            input_tokens: u["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: u["completion_tokens"].as_u64().unwrap_or(0) as u32,
        });

        Ok(ChatResponse {
            content,
            model: self.model.clone(),
            provider: "openai".to_string(),
            usage,
            finish_reason: json["choices"][0]["finish_reason"]
                .as_str()
                .map(|s| s.to_string()),
            latency_ms: latency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::llm::types::ChatMessage;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenAiProvider {
        OpenAiProvider::new(
            "sk-test".to_string(),
            "gpt-4o".to_string(),
            Some(server.uri()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_chat_parses_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{
                    "message": { "role": "assistant", "content": "{\"className\":\"Mage\"}" },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 42, "completion_tokens": 17 }
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let response = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("generate")]))
            .await
            .unwrap();

        assert_eq!(response.content, "{\"className\":\"Mage\"}");
        assert_eq!(response.provider, "openai");
        assert_eq!(response.usage.unwrap().input_tokens, 42);
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    }

    #[tokio::test]
    async fn test_chat_maps_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("generate")]))
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_chat_maps_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("generate")]))
            .await
            .unwrap_err();

        match err {
            LLMError::ApiError { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_rejects_missing_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&server)
            .await;

        let provider = provider_for(&server);
        let err = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("generate")]))
            .await
            .unwrap_err();

        assert!(matches!(err, LLMError::InvalidResponse(_)));
    }
}
