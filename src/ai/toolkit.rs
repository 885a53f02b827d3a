use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::{http_client, ChatClient, ChatMessage, ProviderError};

/// Hosted multimodal endpoint taking `{messages}` and answering `{completion}`.
pub struct ToolkitClient {
    endpoint: String,
    api_key: Option<String>,
    http: reqwest::Client,
    timeout: Duration,
}

#[derive(Serialize)]
struct ToolkitRequest<'a> {
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ToolkitResponse {
    #[serde(default)]
    completion: Option<String>,
}

impl ToolkitClient {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            endpoint: endpoint.to_string(),
            api_key,
            http: http_client(timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl ChatClient for ToolkitClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let mut req = self.http.post(&self.endpoint).json(&ToolkitRequest { messages });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let response = req
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response).await);
        }

        let parsed: ToolkitResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        parsed
            .completion
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyCompletion)
    }
}
