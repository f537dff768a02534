use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde::Serialize;

use crate::error::CvServiceError;
use crate::state::AppState;
use crate::usecase::webhook::{HandleWebhookUseCase, WebhookOutcome, parse_webhook};

#[derive(Serialize)]
pub struct WebhookAck {
    pub acknowledged: bool,
    pub outcome: WebhookOutcome,
}

// ── POST /payments/webhook/{correlation_token} ───────────────────────────────

pub async fn payment_webhook_with_token(
    State(state): State<AppState>,
    Path(correlation_token): Path<String>,
    body: Bytes,
) -> Result<Json<WebhookAck>, CvServiceError> {
    handle(state, Some(correlation_token), body).await
}

// ── POST /payments/webhook ───────────────────────────────────────────────────

pub async fn payment_webhook(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<WebhookAck>, CvServiceError> {
    handle(state, None, body).await
}

async fn handle(
    state: AppState,
    path_token: Option<String>,
    body: Bytes,
) -> Result<Json<WebhookAck>, CvServiceError> {
    let payload: serde_json::Value =
        serde_json::from_slice(&body).map_err(|_| CvServiceError::InvalidWebhook)?;
    let notification = parse_webhook(path_token.as_deref(), payload)?;

    let usecase = HandleWebhookUseCase {
        users: state.user_port(),
        cvs: state.cv_repo(),
        payments: state.payment_repo(),
        notifier: state.notifier(),
        webhook_secret: state.webhook_secret.clone(),
        notify_policy: state.notify_policy,
    };
    let outcome = usecase.execute(notification).await?;
    Ok(Json(WebhookAck::from(outcome)))
}

impl From<WebhookOutcome> for WebhookAck {
    fn from(outcome: WebhookOutcome) -> Self {
        Self {
            acknowledged: true,
            outcome,
        }
    }
}
