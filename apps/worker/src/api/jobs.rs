use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Debug, Deserialize)]
pub struct EnqueueRequest {
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct EnqueueResponse {
    pub success: bool,
    pub job_id: String,
    pub message: String,
}

/// Accepts any job type; unknown types fail later in the worker, not here.
async fn enqueue_job(
    State(state): State<Arc<AppState>>,
    body: Result<Json<EnqueueRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<EnqueueResponse>)> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let job_type = request.job_type.trim();
    if job_type.is_empty() {
        return Err(ApiError::BadRequest("Job type is required".to_string()));
    }

    let job_id = state.enqueuer.enqueue_raw(job_type, request.data).await?;
    tracing::info!("Enqueued {} job {}", job_type, job_id);

    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueResponse {
            success: true,
            message: format!("Job {} enqueued", job_id),
            job_id,
        }),
    ))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/enqueue", post(enqueue_job))
}
