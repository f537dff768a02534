#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{
    ChargeRequest, CredentialsEmail, Cv, CvOwner, Payment, ReconcileCommand, ReconcileOutcome,
};
use crate::error::CvServiceError;

/// Read access to user profiles owned by the identity provider.
pub trait UserPort: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CvOwner>, CvServiceError>;
}

/// Repository for CV records.
pub trait CvRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cv>, CvServiceError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<Cv>, CvServiceError>;

    /// CVs owned by a user, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Cv>, CvServiceError>;

    /// Insert a CV. Fails with `UsernameTaken` on a username collision.
    async fn create(&self, cv: &Cv) -> Result<(), CvServiceError>;

    /// Replace the stored PIN hash. Returns `false` if the CV does not exist.
    async fn update_pin_hash(&self, id: Uuid, pin_hash: &str) -> Result<bool, CvServiceError>;

    /// Delete a CV. Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: Uuid) -> Result<bool, CvServiceError>;
}

/// Repository for payment records.
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> Result<(), CvServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, CvServiceError>;

    /// Update the payment and the linked CV's state and record the delivery in
    /// the processed ledger, in one transaction. A payment that already holds
    /// this transaction id and state is left untouched.
    async fn reconcile(
        &self,
        command: &ReconcileCommand,
    ) -> Result<ReconcileOutcome, CvServiceError>;
}

/// Outbound side of the payment gateway.
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted payment page. `Ok(None)` when the gateway answered
    /// without a URL.
    async fn create_charge(
        &self,
        request: &ChargeRequest,
    ) -> Result<Option<String>, CvServiceError>;
}

/// Best-effort email delivery.
pub trait Notifier: Send + Sync {
    async fn send_credentials(&self, email: &CredentialsEmail) -> Result<(), CvServiceError>;
}
