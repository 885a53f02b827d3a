use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{error, info};
use uuid::Uuid;

use super::dto::{AnalyzeResponse, UploadResponse};
use crate::{
    ai::{client::with_timeout, prompts::translation_messages, suggestion::generate_suggestion},
    error::ApiError,
    history::repo_types::NewAnalysis,
    state::AppState,
    storage::scan_key,
};

/// Lifetime of the presigned link returned after an upload.
const UPLOAD_URL_TTL_SECS: u64 = 30 * 60;

/// One decoded analysis input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub mime: String,
    pub payload: String, // base64, no data-url prefix
}

impl SourceImage {
    /// Accepts raw base64 or a `data:<mime>;base64,<payload>` URL.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let raw = raw.trim();
        let (mime, payload) = match raw.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| ApiError::BadRequest("Invalid image data URL".into()))?;
                let mime = header.split(';').next().filter(|m| !m.is_empty()).unwrap_or("image/jpeg");
                (mime.to_string(), payload.trim())
            }
            None => ("image/jpeg".to_string(), raw),
        };
        STANDARD
            .decode(payload)
            .map_err(|_| ApiError::BadRequest("Invalid base64 image".into()))?;
        Ok(Self {
            mime,
            payload: payload.to_string(),
        })
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.payload)
    }
}

/// Drop blank entries and decode the rest.
pub fn prepare_images(raw: &[String]) -> Result<Vec<SourceImage>, ApiError> {
    let images = raw
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| SourceImage::parse(s))
        .collect::<Result<Vec<_>, _>>()?;
    if images.is_empty() {
        return Err(ApiError::BadRequest("No images provided".into()));
    }
    Ok(images)
}

/// Run the multi-image analysis and save the report. A failed save is
/// logged and the report is still returned.
pub async fn analyze_and_store(
    st: &AppState,
    user_id: Uuid,
    images: Vec<SourceImage>,
) -> Result<AnalyzeResponse, ApiError> {
    let payloads: Vec<String> = images.iter().map(|i| i.payload.clone()).collect();
    let outcome = st.analyzer.analyze(&payloads).await?;

    let new = NewAnalysis {
        user_id,
        image_urls: outcome.sources.iter().map(|&i| images[i].data_url()).collect(),
        analysis_result: serde_json::Value::String(outcome.report.clone()),
        suggestions: None,
    };
    let record_id = match st.analyses.insert(new).await {
        Ok(rec) => {
            info!(record_id = %rec.record_id, "analysis saved");
            Some(rec.record_id)
        }
        Err(e) => {
            error!(error = %e, "saving analysis failed; returning unsaved report");
            None
        }
    };

    Ok(AnalyzeResponse {
        report: outcome.report,
        record_id,
    })
}

pub(crate) fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn mime_from_name(name: &str) -> Option<&'static str> {
    let ext = name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Content type to store the upload under, if it is an accepted image.
pub(crate) fn accepted_image_type(content_type: Option<&str>, file_name: &str) -> Option<String> {
    match content_type {
        Some(ct) if ext_from_mime(ct).is_some() => Some(ct.to_string()),
        _ => mime_from_name(file_name).map(str::to_string),
    }
}

pub struct UploadItem {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Store the scan, classify it, explain the findings and save the record.
pub async fn upload_and_classify(
    st: &AppState,
    user_id: Uuid,
    item: UploadItem,
) -> Result<UploadResponse, ApiError> {
    const FAILED: &str = "Failed to upload and analyze X-ray";

    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let key = scan_key(user_id, millis, &item.file_name);
    st.storage
        .put_object(&key, item.body.clone(), &item.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;

    let timeout = st.call_timeout();
    let report = with_timeout(
        timeout,
        st.classifier.classify(&item.file_name, item.body, &item.content_type),
    )
    .await
    .map_err(|e| ApiError::provider(FAILED, e))?;

    let suggestions = generate_suggestion(st.chat.as_ref(), &report, timeout)
        .await
        .map_err(|e| ApiError::provider(FAILED, e))?;

    let new = NewAnalysis {
        user_id,
        image_urls: vec![key.clone()],
        analysis_result: serde_json::to_value(&report).context("encode classifier report")?,
        suggestions: Some(suggestions.clone()),
    };
    if let Err(e) = st.analyses.insert(new).await {
        error!(error = %e, "saving upload analysis failed");
    }

    let image_url = st
        .storage
        .presign_get(&key, UPLOAD_URL_TTL_SECS)
        .await
        .with_context(|| format!("presign url for {}", key))?;

    Ok(UploadResponse {
        image_url,
        analysis_result: report,
        suggestions,
    })
}

pub async fn translate(st: &AppState, text: &str, language: &str) -> Result<String, ApiError> {
    let messages = translation_messages(text, language);
    with_timeout(st.call_timeout(), st.chat.complete(&messages))
        .await
        .map_err(|e| ApiError::provider("Translation failed", e))
}

/// Synthesize speech and return it base64-encoded.
pub async fn speech(st: &AppState, text: &str) -> Result<String, ApiError> {
    let audio = with_timeout(st.call_timeout(), st.speech.synthesize(text))
        .await
        .map_err(|e| ApiError::provider("Speech generation failed", e))?;
    Ok(STANDARD.encode(&audio))
}
