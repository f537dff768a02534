use serde::Serialize;
use serde_json::{Map, Value};

use digitalcv_domain::id::PaymentId;
use digitalcv_domain::payment::{NotifyPolicy, PaymentStatus};

use crate::crypto::{generate_pin, hash_pin, verify_webhook_signature};
use crate::domain::repository::{CvRepository, Notifier, PaymentRepository, UserPort};
use crate::domain::types::{
    CredentialsEmail, Cv, ReconcileCommand, ReconcileOutcome, WebhookNotification,
};
use crate::error::CvServiceError;

// ── Payload parsing ──────────────────────────────────────────────────────────

/// First non-blank string (or number) found under any of `names`, as given.
fn field(object: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match object.get(*name)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Extract the fields the reconciliation needs from an arbitrary gateway
/// payload. A token from the URL path takes precedence over the body.
pub fn parse_webhook(
    path_token: Option<&str>,
    payload: Value,
) -> Result<WebhookNotification, CvServiceError> {
    let object = payload.as_object().ok_or(CvServiceError::InvalidWebhook)?;

    let correlation_token = path_token
        .filter(|t| !t.trim().is_empty())
        .map(str::to_owned)
        .or_else(|| field(object, &["correlation_token", "correlationToken"]))
        .ok_or(CvServiceError::InvalidWebhook)?;
    let gateway_transaction_id = field(
        object,
        &["gateway_transaction_id", "gatewayTransactionId"],
    )
    .ok_or(CvServiceError::InvalidWebhook)?;
    let state = field(object, &["state", "status"]).ok_or(CvServiceError::InvalidWebhook)?;
    let signature = field(object, &["signature"]);

    Ok(WebhookNotification {
        correlation_token,
        gateway_transaction_id,
        state,
        signature,
        raw_payload: payload,
    })
}

// ── HandleWebhook ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookOutcome {
    Applied,
    Duplicate,
    UnrecognizedState,
}

pub struct HandleWebhookUseCase<U, C, P, N>
where
    U: UserPort,
    C: CvRepository,
    P: PaymentRepository,
    N: Notifier,
{
    pub users: U,
    pub cvs: C,
    pub payments: P,
    pub notifier: N,
    pub webhook_secret: String,
    pub notify_policy: NotifyPolicy,
}

impl<U, C, P, N> HandleWebhookUseCase<U, C, P, N>
where
    U: UserPort,
    C: CvRepository,
    P: PaymentRepository,
    N: Notifier,
{
    pub async fn execute(
        &self,
        notification: WebhookNotification,
    ) -> Result<WebhookOutcome, CvServiceError> {
        let signature = notification
            .signature
            .as_deref()
            .ok_or(CvServiceError::InvalidSignature)?;
        if !verify_webhook_signature(
            &self.webhook_secret,
            &notification.correlation_token,
            &notification.gateway_transaction_id,
            &notification.state,
            signature,
        )? {
            tracing::warn!(
                correlation_token = %notification.correlation_token,
                "webhook signature mismatch"
            );
            return Err(CvServiceError::InvalidSignature);
        }

        // Tokens are payment ids; anything else cannot match a payment.
        let payment_id: PaymentId = notification
            .correlation_token
            .parse()
            .map_err(|_| CvServiceError::PaymentNotFound)?;
        let payment = self
            .payments
            .find_by_id(payment_id.0)
            .await?
            .ok_or(CvServiceError::PaymentNotFound)?;

        let status = PaymentStatus::parse(&notification.state);
        if status.is_unknown() {
            tracing::warn!(
                payment_id = %payment_id,
                state = %notification.state,
                "unrecognized payment state; cv left unchanged"
            );
        }
        let command = ReconcileCommand {
            payment_id: payment.id,
            cv_id: payment.cv_id,
            gateway_transaction_id: notification.gateway_transaction_id,
            status: notification.state,
            normalized_status: status.normalized(),
            raw_payload: notification.raw_payload,
            target_cv_state: status.target_cv_state(),
        };

        let cv = match self.payments.reconcile(&command).await? {
            ReconcileOutcome::Duplicate => {
                tracing::info!(
                    payment_id = %payment_id,
                    gateway_transaction_id = %command.gateway_transaction_id,
                    state = %command.normalized_status,
                    "duplicate webhook delivery ignored"
                );
                return Ok(WebhookOutcome::Duplicate);
            }
            ReconcileOutcome::Applied { cv } => cv,
        };

        match (&cv, command.target_cv_state, command.cv_id) {
            (Some(cv), Some(state), _) => {
                tracing::info!(
                    payment_id = %payment_id,
                    cv_id = %cv.id,
                    state = %state,
                    "cv state updated"
                );
            }
            (None, Some(_), Some(cv_id)) => {
                tracing::warn!(
                    payment_id = %payment_id,
                    cv_id = %cv_id,
                    "linked cv not found"
                );
            }
            (None, Some(_), None) => {
                tracing::info!(payment_id = %payment_id, "payment has no linked cv");
            }
            _ => {}
        }
        tracing::info!(
            payment_id = %payment_id,
            state = %command.status,
            "payment webhook applied"
        );

        if let Some(cv) = cv {
            if self.notify_policy.should_notify(&status) {
                self.send_credentials(&cv).await;
            }
        }

        Ok(if status.is_unknown() {
            WebhookOutcome::UnrecognizedState
        } else {
            WebhookOutcome::Applied
        })
    }

    /// Issue a fresh PIN and mail it to the CV owner. Failures are logged and
    /// swallowed; the webhook is already committed.
    async fn send_credentials(&self, cv: &Cv) {
        let owner = match self.users.find_by_id(cv.user_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                tracing::info!(cv_id = %cv.id, "cv owner not found; no email sent");
                return;
            }
            Err(e) => {
                tracing::warn!(cv_id = %cv.id, error = ?e, "cv owner lookup failed");
                return;
            }
        };

        let pin = generate_pin();
        let rotated = match hash_pin(&pin) {
            Ok(hash) => self.cvs.update_pin_hash(cv.id, &hash).await,
            Err(e) => Err(e),
        };
        match rotated {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(cv_id = %cv.id, "cv vanished before pin rotation");
                return;
            }
            Err(e) => {
                tracing::warn!(cv_id = %cv.id, error = ?e, "pin rotation failed");
                return;
            }
        }

        let email = CredentialsEmail {
            to: owner.email,
            recipient_name: owner.name,
            cv_username: cv.username.clone(),
            cv_pin: pin,
        };
        if let Err(e) = self.notifier.send_credentials(&email).await {
            tracing::warn!(cv_id = %cv.id, error = ?e, "credentials email failed");
        }
    }
}
