use serde::{Deserialize, Serialize};

use crate::ai::client::ClassifierReport;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub report: String,
    /// None when the report could not be saved.
    pub record_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub image_url: String,
    pub analysis_result: ClassifierReport,
    pub suggestions: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslateRequest {
    pub text: String,
    pub language_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translated_text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TtsRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct TtsResponse {
    /// Base64-encoded audio.
    pub audio: String,
    pub format: &'static str,
}
