use axum::{extract::State, http::StatusCode};

use digitalcv_core::health::db_readiness;

use crate::state::AppState;

/// `GET /readyz`: ready once the database answers.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    db_readiness(&state.db).await
}
