use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{
        AnalyzeRequest, AnalyzeResponse, TranslateRequest, TranslateResponse, TtsRequest,
        TtsResponse, UploadResponse,
    },
    services::{self, accepted_image_type, UploadItem},
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, Envelope},
    extract::ApiJson,
    state::AppState,
};

pub fn xray_routes() -> Router<AppState> {
    Router::new()
        .route("/xray/analyze", post(analyze))
        .route("/xray/upload", post(upload))
        .route("/xray/translate", post(translate))
        .route("/xray/tts", post(tts))
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024)) // 25MB
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id, images = payload.images.len()))]
pub async fn analyze(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiJson(payload): ApiJson<AnalyzeRequest>,
) -> Result<Json<Envelope<AnalyzeResponse>>, ApiError> {
    let images = services::prepare_images(&payload.images)?;
    let result = services::analyze_and_store(&state, user.id, images).await?;
    Ok(Envelope::success("Analysis completed", result))
}

/// POST /xray/upload (multipart), field `file`.
#[instrument(skip(state, user, mp), fields(user_id = %user.id))]
pub async fn upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mut mp: Multipart,
) -> Result<Json<Envelope<UploadResponse>>, ApiError> {
    let mut item: Option<(String, Option<String>, bytes::Bytes)> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?;
        item = Some((file_name, content_type, data));
        break;
    }

    let (file_name, content_type, body) = item
        .filter(|(_, _, body)| !body.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No X-ray file uploaded".into()))?;
    let content_type = accepted_image_type(content_type.as_deref(), &file_name).ok_or_else(|| {
        warn!(%file_name, "rejected non-image upload");
        ApiError::BadRequest("Only images are allowed".into())
    })?;

    info!(%file_name, size = body.len(), "x-ray upload received");
    let result = services::upload_and_classify(
        &state,
        user.id,
        UploadItem {
            file_name,
            content_type,
            body,
        },
    )
    .await?;
    Ok(Envelope::success("X-ray uploaded and analyzed", result))
}

#[instrument(skip(state, _user, payload), fields(language = %payload.language_name))]
pub async fn translate(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    ApiJson(payload): ApiJson<TranslateRequest>,
) -> Result<Json<Envelope<TranslateResponse>>, ApiError> {
    let text = payload.text.trim();
    let language = payload.language_name.trim();
    if text.is_empty() || language.is_empty() {
        return Err(ApiError::BadRequest("text and languageName are required".into()));
    }
    let translated_text = services::translate(&state, text, language).await?;
    Ok(Envelope::success(
        "Translation completed",
        TranslateResponse { translated_text },
    ))
}

#[instrument(skip(state, _user, payload), fields(chars = payload.text.len()))]
pub async fn tts(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    ApiJson(payload): ApiJson<TtsRequest>,
) -> Result<Json<Envelope<TtsResponse>>, ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("text is required".into()));
    }
    let audio = services::speech(&state, text).await?;
    Ok(Envelope::success(
        "Speech generated",
        TtsResponse { audio, format: "mp3" },
    ))
}
