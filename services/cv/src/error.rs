use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// CV service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum CvServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("cv not found")]
    CvNotFound,
    #[error("payment not found")]
    PaymentNotFound,
    #[error("username already taken")]
    UsernameTaken,
    #[error("invalid username")]
    InvalidUsername,
    #[error("invalid cv content")]
    InvalidContent,
    #[error("invalid webhook payload")]
    InvalidWebhook,
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("cv not active")]
    CvNotActive,
    #[error("forbidden")]
    Forbidden,
    #[error("payment could not be started")]
    PaymentNotStarted,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl CvServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::CvNotFound => "CV_NOT_FOUND",
            Self::PaymentNotFound => "PAYMENT_NOT_FOUND",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::InvalidContent => "INVALID_CONTENT",
            Self::InvalidWebhook => "INVALID_WEBHOOK",
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::CvNotActive => "CV_NOT_ACTIVE",
            Self::Forbidden => "FORBIDDEN",
            Self::PaymentNotStarted => "PAYMENT_NOT_STARTED",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for CvServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::CvNotFound | Self::PaymentNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::UsernameTaken => StatusCode::CONFLICT,
            Self::InvalidUsername | Self::InvalidContent | Self::InvalidWebhook => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidSignature | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::CvNotActive | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::PaymentNotStarted => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer records the status; the anyhow chain is only visible here.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
