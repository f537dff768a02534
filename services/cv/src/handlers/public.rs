use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CvServiceError;
use crate::state::AppState;
use crate::usecase::cv::ViewPublicCvUseCase;

// ── POST /public/cv ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ViewCvRequest {
    pub username: String,
    pub pin: String,
}

#[derive(Serialize)]
pub struct PublicCvResponse {
    pub username: String,
    pub content: serde_json::Value,
    #[serde(serialize_with = "digitalcv_core::serde::to_rfc3339_ms")]
    pub valid_until: DateTime<Utc>,
}

pub async fn view_public_cv(
    State(state): State<AppState>,
    Json(body): Json<ViewCvRequest>,
) -> Result<Json<PublicCvResponse>, CvServiceError> {
    let usecase = ViewPublicCvUseCase {
        repo: state.cv_repo(),
    };
    let cv = usecase.execute(&body.username, &body.pin).await?;
    Ok(Json(PublicCvResponse {
        username: cv.username,
        content: cv.content,
        valid_until: cv.window.end,
    }))
}
