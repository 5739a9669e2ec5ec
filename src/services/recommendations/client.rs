//! OpenAI 兼容的对话补全客户端

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AiConfig, AppConfig};
use crate::errors::{EdulyticsError, Result};

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// 发送一轮对话，返回模型回复的文本
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiClient {
    pub fn new(config: &AiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .map_err(|e| EdulyticsError::external_service(format!("创建 AI 客户端失败: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        if !self.is_configured() {
            return Err(EdulyticsError::external_service("AI API key is not configured"));
        }

        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(model = %self.model, prompt_len = user.len(), "Sending chat completion request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EdulyticsError::external_service(format!(
                "AI service returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| EdulyticsError::external_service("AI service returned an empty reply"))
    }
}

/// 按配置创建客户端
pub fn create_chat_client() -> Result<Arc<dyn ChatClient>> {
    let client = OpenAiClient::new(&AppConfig::get().ai)?;
    if !client.is_configured() {
        tracing::warn!("AI API key is not set, recommendations will use fallback content");
    }
    Ok(Arc::new(client))
}

#[cfg(test)]
pub mod testing {
    use std::sync::Mutex;

    use super::*;

    /// 返回固定回复并记录提示词
    pub struct ScriptedClient {
        reply: Result<String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: Err(EdulyticsError::external_service("unavailable")),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn complete(&self, _system: &str, user: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(user.to_string());
            self.reply.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_normalizes_trailing_slash() {
        let config = AiConfig {
            enabled: true,
            api_key: String::new(),
            base_url: "https://api.example.com/v1/".to_string(),
            model: "gpt-4o".to_string(),
            max_tokens: 100,
            temperature: 0.5,
            timeout: 5,
        };
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(client.endpoint, "https://api.example.com/v1/chat/completions");
        assert!(!client.is_configured());
    }

    #[test]
    fn test_request_serialization() {
        let payload = ChatCompletionRequest {
            model: "gpt-4o",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            max_tokens: 10,
            temperature: 0.7,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 10);
    }
}
