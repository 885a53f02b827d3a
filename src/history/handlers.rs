use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{ClearedResponse, HistoryPage, Pagination};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, Envelope},
    extract::ApiQuery,
    state::AppState,
};

pub fn history_routes() -> Router<AppState> {
    Router::new()
        .route("/history/get-history", get(get_history))
        .route("/history/clear-history", put(clear_history))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn get_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ApiQuery(p): ApiQuery<Pagination>,
) -> Result<Json<Envelope<HistoryPage>>, ApiError> {
    let (page, limit, offset) = p.resolve();
    let items = state.analyses.list_active(user.id, limit, offset).await?;
    let total_count = state.analyses.count_active(user.id).await?;
    Ok(Envelope::success(
        "History fetched",
        HistoryPage {
            items,
            total_count,
            page,
            limit,
        },
    ))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn clear_history(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Envelope<ClearedResponse>>, ApiError> {
    let cleared = state.analyses.clear_history(user.id).await?;
    info!(cleared, "history cleared");
    Ok(Envelope::success("History cleared", ClearedResponse { cleared }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::history::dto::MAX_LIMIT;
    use crate::history::repo_types::AnalysisStatus;
    use crate::testing::{read_json, TestApp};

    #[tokio::test]
    async fn history_is_paginated_newest_first() {
        let app = TestApp::new();
        let (user, token) = app.verified_user("ada@example.com", "password123").await;
        for i in 0..5 {
            app.seed_analysis(user.id, &format!("report {i}")).await;
        }

        let response = app.get("/api/history/get-history?page=1&limit=2", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["totalCount"], 5);
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["analysisResult"], "report 4");
        assert_eq!(items[1]["analysisResult"], "report 3");

        let response = app.get("/api/history/get-history?page=3&limit=2", Some(&token)).await;
        let body = read_json(response).await;
        assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn huge_page_returns_an_empty_page() {
        let app = TestApp::new();
        let (user, token) = app.verified_user("ada@example.com", "password123").await;
        app.seed_analysis(user.id, "only").await;

        let uri = format!("/api/history/get-history?page={}", i64::MAX);
        let response = app.get(&uri, Some(&token)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = read_json(response).await;
        assert_eq!(body["data"]["page"], i64::MAX / MAX_LIMIT);
        assert_eq!(body["data"]["totalCount"], 1);
        assert!(body["data"]["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_query_uses_error_envelope() {
        let app = TestApp::new();
        let (_, token) = app.verified_user("ada@example.com", "password123").await;

        let response = app.get("/api/history/get-history?page=abc", Some(&token)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = read_json(response).await;
        assert_eq!(body["status"], "fail");
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_history_archives_and_is_idempotent() {
        let app = TestApp::new();
        let (user, token) = app.verified_user("ada@example.com", "password123").await;
        let (other, _) = app.verified_user("bob@example.com", "password123").await;
        app.seed_analysis(user.id, "a").await;
        app.seed_analysis(user.id, "b").await;
        app.seed_analysis(other.id, "c").await;

        let response = app.put("/api/history/clear-history", &token).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["data"]["cleared"], 2);

        let response = app.put("/api/history/clear-history", &token).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["data"]["cleared"], 0);

        let records = app.analyses.all_for(user.id);
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.status == AnalysisStatus::Cleared));
        assert!(app
            .analyses
            .all_for(other.id)
            .iter()
            .all(|r| r.status == AnalysisStatus::Active));

        let response = app.get("/api/history/get-history", Some(&token)).await;
        let body = read_json(response).await;
        assert_eq!(body["data"]["totalCount"], 0);
        assert!(body["data"]["items"].as_array().unwrap().is_empty());
    }
}
