use std::{collections::BTreeMap, future::Future, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Longest provider body kept in error values and logs.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    Image { image: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// Text parts joined by newlines; images are skipped.
    pub fn text(&self) -> String {
        match self {
            Self::Text(t) => t.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|p| match p {
                    ContentPart::Text { text } => Some(text.as_str()),
                    ContentPart::Image { .. } => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_with_image(text: impl Into<String>, image_b64: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(vec![
                ContentPart::Text { text: text.into() },
                ContentPart::Image {
                    image: image_b64.into(),
                },
            ]),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode provider response: {0}")]
    Decode(String),
    #[error("provider returned an empty completion")]
    EmptyCompletion,
}

impl ProviderError {
    pub(crate) fn from_reqwest(e: reqwest::Error, timeout: Duration) -> Self {
        if e.is_timeout() {
            Self::Timeout(timeout)
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }

    pub(crate) async fn from_status(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Self::Status { status, body }
    }
}

/// Bound a provider call; an elapsed timer counts as a transport failure.
pub async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ProviderError::Timeout(timeout))?
}

pub(crate) fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Hosted chat model, optionally vision-capable.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}

/// Hosted text-to-speech.
#[async_trait]
pub trait SpeechClient: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<Bytes, ProviderError>;
}

/// Probability map returned by the classifier microservice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierReport {
    #[serde(default)]
    pub probabilities: BTreeMap<String, f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Self-hosted image classifier taking a file upload.
#[async_trait]
pub trait ClassifierClient: Send + Sync {
    async fn classify(
        &self,
        file_name: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<ClassifierReport, ProviderError>;
}
