use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use digitalcv_auth_types::identity::IdentityHeaders;
use digitalcv_domain::cv::CvState;
use digitalcv_domain::id::CvId;

use crate::domain::types::Cv;
use crate::error::CvServiceError;
use crate::state::AppState;
use crate::usecase::cv::{
    CreateCvInput, CreateCvUseCase, DeleteCvUseCase, GetCvUseCase, ListMyCvsUseCase,
};

#[derive(Serialize)]
pub struct CvResponse {
    pub id: String,
    pub username: String,
    pub state: CvState,
    pub content: serde_json::Value,
    #[serde(serialize_with = "digitalcv_core::serde::to_rfc3339_ms")]
    pub start_date: DateTime<Utc>,
    #[serde(serialize_with = "digitalcv_core::serde::to_rfc3339_ms")]
    pub end_date: DateTime<Utc>,
    #[serde(serialize_with = "digitalcv_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "digitalcv_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<Cv> for CvResponse {
    fn from(cv: Cv) -> Self {
        Self {
            id: cv.id.to_string(),
            username: cv.username,
            state: cv.state,
            content: cv.content,
            start_date: cv.window.start,
            end_date: cv.window.end,
            created_at: cv.created_at,
            updated_at: cv.updated_at,
        }
    }
}

// ── POST /cvs ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCvRequest {
    pub username: String,
    pub content: serde_json::Value,
}

/// Returned once at creation; the only response that carries the raw PIN.
#[derive(Serialize)]
pub struct CreateCvResponse {
    pub id: String,
    pub username: String,
    pub pin: String,
    pub state: CvState,
    #[serde(serialize_with = "digitalcv_core::serde::to_rfc3339_ms")]
    pub start_date: DateTime<Utc>,
    #[serde(serialize_with = "digitalcv_core::serde::to_rfc3339_ms")]
    pub end_date: DateTime<Utc>,
}

pub async fn create_cv(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateCvRequest>,
) -> Result<(StatusCode, Json<CreateCvResponse>), CvServiceError> {
    let usecase = CreateCvUseCase {
        users: state.user_port(),
        cvs: state.cv_repo(),
    };
    let output = usecase
        .execute(CreateCvInput {
            user_id: identity.user_id,
            username: body.username,
            content: body.content,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateCvResponse {
            id: output.cv.id.to_string(),
            username: output.cv.username,
            pin: output.pin,
            state: output.cv.state,
            start_date: output.cv.window.start,
            end_date: output.cv.window.end,
        }),
    ))
}

// ── GET /cvs ─────────────────────────────────────────────────────────────────

pub async fn list_my_cvs(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<CvResponse>>, CvServiceError> {
    let usecase = ListMyCvsUseCase {
        repo: state.cv_repo(),
    };
    let cvs = usecase.execute(identity.user_id).await?;
    Ok(Json(cvs.into_iter().map(CvResponse::from).collect()))
}

// ── GET /cvs/{cv_id} ─────────────────────────────────────────────────────────

pub async fn get_cv(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(cv_id): Path<CvId>,
) -> Result<Json<CvResponse>, CvServiceError> {
    let usecase = GetCvUseCase {
        repo: state.cv_repo(),
    };
    let cv = usecase.execute(&identity, cv_id.0).await?;
    Ok(Json(cv.into()))
}

// ── DELETE /cvs/{cv_id} ──────────────────────────────────────────────────────

pub async fn delete_cv(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(cv_id): Path<CvId>,
) -> Result<StatusCode, CvServiceError> {
    let usecase = DeleteCvUseCase {
        repo: state.cv_repo(),
    };
    usecase.execute(&identity, cv_id.0).await?;
    Ok(StatusCode::NO_CONTENT)
}
