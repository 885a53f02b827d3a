//! Multi-image analysis: per-image fan-out with one retry, filtering, and a
//! synthesis pass when more than one image yields a report.

use std::{sync::Arc, time::Duration};

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::{
    client::{with_timeout, ChatClient, ProviderError},
    prompts::{synthesis_messages, PromptTemplate, Verdict},
};
use crate::error::ApiError;

/// First attempt plus one retry.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no images provided")]
    NoImages,
    #[error("no valid medical images")]
    NoValidMedicalImages,
    #[error("summary generation failed: {0}")]
    SummaryGenerationFailed(ProviderError),
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::NoImages => ApiError::BadRequest("No images provided".into()),
            AnalysisError::NoValidMedicalImages => ApiError::NoValidMedicalImages,
            AnalysisError::SummaryGenerationFailed(e) => {
                ApiError::provider("Failed to generate combined summary", e)
            }
        }
    }
}

/// What a single image produced after retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Report(String),
    NotMedical,
    Failed,
}

/// Final report and the 0-based input positions it should be linked to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisOutcome {
    pub report: String,
    pub sources: Vec<usize>,
}

pub struct Analyzer {
    client: Arc<dyn ChatClient>,
    template: PromptTemplate,
    call_timeout: Duration,
    max_attempts: u32,
}

impl Analyzer {
    pub fn new(client: Arc<dyn ChatClient>, call_timeout: Duration) -> Self {
        Self {
            client,
            template: PromptTemplate::medical_analysis(),
            call_timeout,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Analyze base64 images and produce one report.
    #[instrument(skip(self, images), fields(images = images.len()))]
    pub async fn analyze(&self, images: &[String]) -> Result<AnalysisOutcome, AnalysisError> {
        if images.is_empty() {
            return Err(AnalysisError::NoImages);
        }

        let outcomes = join_all(
            images
                .iter()
                .enumerate()
                .map(|(idx, image)| self.analyze_one(idx, image)),
        )
        .await;

        let valid: Vec<(usize, String)> = outcomes
            .into_iter()
            .enumerate()
            .filter_map(|(idx, outcome)| match outcome {
                ImageOutcome::Report(text) => Some((idx, text)),
                ImageOutcome::NotMedical | ImageOutcome::Failed => None,
            })
            .collect();

        info!(valid = valid.len(), "per-image analysis done");

        match valid.len() {
            0 => Err(AnalysisError::NoValidMedicalImages),
            1 => {
                let (idx, report) = valid.into_iter().next().ok_or(AnalysisError::NoValidMedicalImages)?;
                Ok(AnalysisOutcome {
                    report,
                    sources: vec![idx],
                })
            }
            _ => {
                let report = self.synthesize(&valid).await?;
                Ok(AnalysisOutcome {
                    report,
                    sources: (0..images.len()).collect(),
                })
            }
        }
    }

    async fn analyze_one(&self, idx: usize, image: &str) -> ImageOutcome {
        let messages = self.template.messages_for_image(image);
        for attempt in 1..=self.max_attempts {
            let result = with_timeout(self.call_timeout, self.client.complete(&messages)).await;
            match result {
                Ok(text) => match (self.template.validate)(&text) {
                    Verdict::Accept => {
                        debug!(image = idx + 1, attempt, "image accepted");
                        return ImageOutcome::Report(text);
                    }
                    Verdict::NotMedical => {
                        info!(image = idx + 1, "image rejected as not medical");
                        return ImageOutcome::NotMedical;
                    }
                    Verdict::Malformed(reason) => {
                        warn!(image = idx + 1, attempt, reason, "malformed analysis response");
                    }
                },
                Err(e) => {
                    warn!(image = idx + 1, attempt, error = %e, "analysis call failed");
                }
            }
        }
        ImageOutcome::Failed
    }

    async fn synthesize(&self, valid: &[(usize, String)]) -> Result<String, AnalysisError> {
        // Labels follow the original input order, 1-based.
        let labelled: Vec<(usize, String)> = valid
            .iter()
            .map(|(idx, text)| (idx + 1, text.clone()))
            .collect();
        let messages = synthesis_messages(&labelled);

        let text = with_timeout(self.call_timeout, self.client.complete(&messages))
            .await
            .map_err(AnalysisError::SummaryGenerationFailed)?;
        if text.trim().is_empty() {
            return Err(AnalysisError::SummaryGenerationFailed(ProviderError::EmptyCompletion));
        }
        Ok(text)
    }
}
