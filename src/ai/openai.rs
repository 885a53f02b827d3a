use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::{json, Value};

use super::client::{
    http_client, ChatClient, ChatMessage, ContentPart, MessageContent, ProviderError, SpeechClient,
};
use crate::config::OpenAiConfig;

/// OpenAI chat completions and speech synthesis.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    tts_model: String,
    tts_voice: String,
    http: reqwest::Client,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(cfg: &OpenAiConfig, model: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: model.to_string(),
            tts_model: cfg.tts_model.clone(),
            tts_voice: cfg.tts_voice.clone(),
            http: http_client(timeout)?,
            timeout,
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<reqwest::Response, ProviderError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;
        if !response.status().is_success() {
            return Err(ProviderError::from_status(response).await);
        }
        Ok(response)
    }
}

fn data_url(image: &str) -> String {
    if image.starts_with("data:") {
        image.to_string()
    } else {
        format!("data:image/jpeg;base64,{image}")
    }
}

/// Chat-completions wire form of our messages.
fn wire_messages(messages: &[ChatMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|m| {
            let content = match &m.content {
                MessageContent::Text(t) => Value::String(t.clone()),
                MessageContent::Parts(parts) => Value::Array(
                    parts
                        .iter()
                        .map(|p| match p {
                            ContentPart::Text { text } => json!({"type": "text", "text": text}),
                            ContentPart::Image { image } => {
                                json!({"type": "image_url", "image_url": {"url": data_url(image)}})
                            }
                        })
                        .collect(),
                ),
            };
            json!({"role": m.role, "content": content})
        })
        .collect()
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let body = json!({"model": self.model, "messages": wire_messages(messages)});
        let parsed: ChatResponse = self
            .post_json("/chat/completions", &body)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyCompletion)
    }
}

#[async_trait]
impl SpeechClient for OpenAiClient {
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError> {
        let body = json!({
            "model": self.tts_model,
            "voice": self.tts_voice,
            "input": text,
            "response_format": "mp3",
        });
        let audio = self
            .post_json("/audio/speech", &body)
            .await?
            .bytes()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;
        if audio.is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }
        Ok(audio)
    }
}
