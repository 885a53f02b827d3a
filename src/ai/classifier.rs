use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};

use super::client::{http_client, ClassifierClient, ClassifierReport, ProviderError};

/// CheXNet-style microservice taking a multipart `image` field.
pub struct ChexnetClient {
    url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl ChexnetClient {
    pub fn new(url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            url: url.to_string(),
            http: http_client(timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl ClassifierClient for ChexnetClient {
    async fn classify(
        &self,
        file_name: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<ClassifierReport, ProviderError> {
        let part = Part::bytes(body.to_vec())
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        let form = Form::new().part("image", part);

        let response = self
            .http
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_status(response).await);
        }

        response
            .json::<ClassifierReport>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}
