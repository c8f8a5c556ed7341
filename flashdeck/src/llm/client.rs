//! HTTP client for chat-completions style providers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    CompletionProvider, CompletionRequest, LlmConfig, ResponseFormat,
    errors::{LlmError, LlmResult},
};

/// Chat-completions API client
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormatBody {
    #[serde(rename = "type")]
    kind: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    top_p: f32,
    max_completion_tokens: u32,
    stream: bool,
    response_format: ResponseFormatBody,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl ChatCompletionsClient {
    /// Create a client from configuration
    ///
    /// The configured timeout is applied to every request at the transport level.
    pub fn new(config: &LlmConfig) -> LlmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            top_p: request.top_p,
            max_completion_tokens: request.max_tokens,
            stream: false,
            response_format: ResponseFormatBody {
                kind: request.response_format,
            },
        }
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsClient {
    async fn complete(&self, request: &CompletionRequest) -> LlmResult<String> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.body(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    log::warn!("Completion request to {} timed out", self.api_url);
                }
                LlmError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {}", e));
            log::error!("Completion provider returned {}: {}", status, body);
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        extract_content(parsed)
    }
}

fn extract_content(response: ChatResponse) -> LlmResult<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(LlmError::EmptyContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: "sys".to_string(),
            user: "usr".to_string(),
            response_format: ResponseFormat::JsonObject,
            max_tokens: 4096,
            temperature: 0.6,
            top_p: 0.95,
        }
    }

    #[test]
    fn test_request_body_shape() {
        let client = ChatCompletionsClient::new(&LlmConfig::default()).unwrap();
        let request = request();
        let body = serde_json::to_value(client.body(&request)).unwrap();

        assert_eq!(body["model"], "deepseek-r1-distill-qwen-32b");
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "sys"}));
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "usr"}));
        assert_eq!(body["response_format"], json!({"type": "json_object"}));
        assert_eq!(body["stream"], false);
        assert_eq!(body["max_completion_tokens"], 4096);
    }

    #[test]
    fn test_extract_content() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"title\": \"x\"}"}}]
        }))
        .unwrap();
        assert_eq!(extract_content(response).unwrap(), "{\"title\": \"x\"}");
    }

    #[test]
    fn test_missing_or_blank_content_is_an_error() {
        for body in [
            json!({"choices": []}),
            json!({"choices": [{"message": {"content": null}}]}),
            json!({"choices": [{"message": {"content": "  "}}]}),
        ] {
            let response: ChatResponse = serde_json::from_value(body).unwrap();
            assert!(matches!(
                extract_content(response),
                Err(LlmError::EmptyContent)
            ));
        }
    }
}
