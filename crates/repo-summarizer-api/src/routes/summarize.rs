use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use tracing::info;

use crate::dto::requests::SummarizeRequest;
use crate::dto::responses::SummarizeResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn summarize(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SummarizeRequest>,
) -> ApiResult<Json<SummarizeResponse>> {
    if req.github_url.trim().is_empty() {
        return Err(ApiError::BadRequest("github_url must not be empty".to_string()));
    }

    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let started = std::time::Instant::now();
    let result = state
        .orchestrator
        .summarize(&req.github_url, &request_id, &state.cfg.logs_dir())
        .await;

    match result {
        Ok(summary) => {
            info!(request_id = %request_id, elapsed_ms = started.elapsed().as_millis(), outcome = "ok", "summarize request completed");
            Ok(Json(summary))
        }
        Err(e) => {
            info!(request_id = %request_id, elapsed_ms = started.elapsed().as_millis(), outcome = "error", error = %e, "summarize request failed");
            Err(ApiError::from(e))
        }
    }
}
