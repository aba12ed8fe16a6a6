//! Ollama Provider Implementation
//!
//! Local model serving via the Ollama HTTP API. JSON mode is requested so
//! structured-generation prompts get syntactically valid output more often;
//! the contract validator still checks everything.

use crate::core::llm::provider::{LLMError, LLMProvider, Result};
use crate::core::llm::types::{ChatRequest, ChatResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Ollama local provider
pub struct OllamaProvider {
    host: String,
    model: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(host: String, model: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            host: host.trim_end_matches('/').to_string(),
            model,
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
impl LLMProvider for OllamaProvider {
    fn id(&self) -> &str {
        "ollama"
    }

    fn name(&self) -> &str {
        "Ollama (Local)"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/api/tags", self.host))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
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
            "stream": false,
            "format": "json",
        });

        if let Some(temp) = request.temperature {
            body["options"] = serde_json::json!({ "temperature": temp });
        }

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(format!("{}/api/chat", self.host))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        let status = resp.status();
        let latency = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(LLMError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let json: serde_json::Value = resp.json().await?;

        let content = json["message"]["content"]
            .as_str()
            .ok_or_else(|| LLMError::InvalidResponse("Missing message.content".to_string()))?
            .to_string();

        let usage = match (
            json["prompt_eval_count"].as_u64(),
            json["eval_count"].as_u64(),
        ) {
            (None, None) => None,
            (input, output) => Some(TokenUsage {
                input_tokens: input.unwrap_or(0) as u32,
                output_tokens: output.unwrap_or(0) as u32,
            }),
        };

        Ok(ChatResponse {
            content,
            model: self.model.clone(),
            provider: "ollama".to_string(),
            usage,
            finish_reason: json["done_reason"].as_str().map(|s| s.to_string()),
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

    #[tokio::test]
    async fn test_chat_parses_message_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": { "role": "assistant", "content": "{\"ok\":true}" },
                "done_reason": "stop",
                "prompt_eval_count": 10,
                "eval_count": 5
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(
            server.uri(),
            "llama3.2".to_string(),
            Duration::from_secs(5),
        );
        let response = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("generate")]))
            .await
            .unwrap();

        assert_eq!(response.content, "{\"ok\":true}");
        assert_eq!(response.provider, "ollama");
        assert_eq!(response.usage.unwrap().output_tokens, 5);
    }

    #[tokio::test]
    async fn test_chat_maps_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(
            server.uri(),
            "missing".to_string(),
            Duration::from_secs(5),
        );
        let err = provider
            .chat(ChatRequest::new(vec![ChatMessage::user("generate")]))
            .await
            .unwrap_err();

        match err {
            LLMError::ApiError { status, .. } => assert_eq!(status, 404),
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_host_trailing_slash_is_trimmed() {
        let provider = OllamaProvider::new(
            "http://localhost:11434/".to_string(),
            "llama3.2".to_string(),
            Duration::from_secs(5),
        );
        assert_eq!(provider.host, "http://localhost:11434");
    }
}
