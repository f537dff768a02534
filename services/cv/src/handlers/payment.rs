use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use digitalcv_auth_types::identity::IdentityHeaders;
use digitalcv_domain::id::{CvId, PaymentId};

use crate::error::CvServiceError;
use crate::state::AppState;
use crate::usecase::payment::{GetPaymentStatusUseCase, GetPaymentUseCase, StartPaymentUseCase};

// ── POST /cvs/{cv_id}/payments ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct StartPaymentResponse {
    pub payment_id: String,
    pub redirect_url: String,
}

pub async fn start_payment(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(cv_id): Path<CvId>,
) -> Result<(StatusCode, Json<StartPaymentResponse>), CvServiceError> {
    let usecase = StartPaymentUseCase {
        users: state.user_port(),
        cvs: state.cv_repo(),
        payments: state.payment_repo(),
        gateway: state.gateway(),
        pricing: state.pricing.clone(),
        public_base_url: state.public_base_url.clone(),
    };
    let output = usecase.execute(&identity, cv_id.0).await?;
    Ok((
        StatusCode::CREATED,
        Json(StartPaymentResponse {
            payment_id: output.payment_id.to_string(),
            redirect_url: output.redirect_url,
        }),
    ))
}

// ── GET /payments/{payment_id} ───────────────────────────────────────────────

#[derive(Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub cv_id: Option<String>,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub gateway_transaction_id: Option<String>,
    #[serde(serialize_with = "digitalcv_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "digitalcv_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

pub async fn get_payment(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(payment_id): Path<PaymentId>,
) -> Result<Json<PaymentResponse>, CvServiceError> {
    let usecase = GetPaymentUseCase {
        payments: state.payment_repo(),
    };
    let payment = usecase.execute(&identity, payment_id).await?;
    Ok(Json(PaymentResponse {
        id: payment.id.to_string(),
        cv_id: payment.cv_id.map(|id| id.to_string()),
        amount: payment.amount,
        currency: payment.currency,
        status: payment.status,
        gateway_transaction_id: payment.gateway_transaction_id,
        created_at: payment.created_at,
        updated_at: payment.updated_at,
    }))
}

// ── GET /payments/{payment_id}/status ────────────────────────────────────────

#[derive(Serialize)]
pub struct PaymentStatusResponse {
    pub payment_id: String,
    pub status: String,
}

pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<PaymentId>,
) -> Result<Json<PaymentStatusResponse>, CvServiceError> {
    let usecase = GetPaymentStatusUseCase {
        payments: state.payment_repo(),
    };
    let status = usecase.execute(payment_id).await?;
    Ok(Json(PaymentStatusResponse {
        payment_id: payment_id.to_string(),
        status,
    }))
}
