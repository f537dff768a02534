use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use digitalcv_domain::cv::{CvState, ValidityWindow};

/// Generated digital CV with its credentials and activation state.
#[derive(Debug, Clone)]
pub struct Cv {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    /// Argon2id PHC string.
    pub pin_hash: String,
    pub content: serde_json::Value,
    pub state: CvState,
    pub window: ValidityWindow,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cv {
    /// Publicly viewable: active and inside its validity window.
    pub fn is_viewable_at(&self, at: DateTime<Utc>) -> bool {
        self.state == CvState::Active && self.window.contains(at)
    }
}

/// One payment attempt for CV activation.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub cv_id: Option<Uuid>,
    pub amount: i64,
    pub currency: String,
    pub gateway_transaction_id: Option<String>,
    /// Status string as last reported; `PENDING` until the webhook arrives.
    pub status: String,
    pub request_payload: serde_json::Value,
    pub response_payload: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The part of a user profile this service reads.
#[derive(Debug, Clone)]
pub struct CvOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Fixed activation price in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pricing {
    pub amount_minor: i64,
    pub currency: String,
}

/// Outbound charge request; also persisted verbatim as the payment's
/// request snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    pub amount: i64,
    pub currency: String,
    pub redirect_url: String,
    pub webhook_url: String,
    pub correlation_token: String,
    pub customer_reference: String,
}

/// Verified webhook fields, extracted from the raw payload.
#[derive(Debug, Clone)]
pub struct WebhookNotification {
    pub correlation_token: String,
    pub gateway_transaction_id: String,
    pub state: String,
    pub signature: Option<String>,
    pub raw_payload: serde_json::Value,
}

/// Everything the store must apply for one webhook delivery, atomically.
#[derive(Debug, Clone)]
pub struct ReconcileCommand {
    pub payment_id: Uuid,
    pub cv_id: Option<Uuid>,
    pub gateway_transaction_id: String,
    /// Raw status, stored as given.
    pub status: String,
    /// Trimmed, lower-cased status used for duplicate detection.
    pub normalized_status: String,
    pub raw_payload: serde_json::Value,
    pub target_cv_state: Option<CvState>,
}

/// Result of applying a [`ReconcileCommand`].
#[derive(Debug, Clone)]
pub enum ReconcileOutcome {
    /// State change applied. `cv` is the updated CV, `None` when the payment has no
    /// linked CV, the CV is gone, or no transition applied.
    Applied { cv: Option<Cv> },
    /// The payment already holds this transaction id and status.
    Duplicate,
}

/// Credentials email sent to a CV owner.
#[derive(Debug, Clone)]
pub struct CredentialsEmail {
    pub to: String,
    pub recipient_name: String,
    pub cv_username: String,
    pub cv_pin: String,
}
