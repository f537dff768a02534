use axum::{
    Router,
    routing::{get, post},
};

use digitalcv_core::health::healthz;
use digitalcv_core::middleware::{
    http_trace_layer, propagate_request_id_layer, request_id_layer,
};

use crate::handlers::{
    cv::{create_cv, delete_cv, get_cv, list_my_cvs},
    health::readyz,
    payment::{get_payment, get_payment_status, start_payment},
    public::view_public_cv,
    webhook::{payment_webhook, payment_webhook_with_token},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // CVs
        .route("/cvs", post(create_cv).get(list_my_cvs))
        .route("/cvs/{cv_id}", get(get_cv).delete(delete_cv))
        // Payments
        .route("/cvs/{cv_id}/payments", post(start_payment))
        .route("/payments/{payment_id}", get(get_payment))
        .route("/payments/{payment_id}/status", get(get_payment_status))
        // Gateway callbacks
        .route("/payments/webhook", post(payment_webhook))
        .route(
            "/payments/webhook/{correlation_token}",
            post(payment_webhook_with_token),
        )
        // Public access
        .route("/public/cv", post(view_public_cv))
        .layer(propagate_request_id_layer())
        .layer(http_trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
