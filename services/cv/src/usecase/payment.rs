use anyhow::Context as _;
use chrono::Utc;
use uuid::Uuid;

use digitalcv_auth_types::identity::IdentityHeaders;
use digitalcv_domain::id::PaymentId;
use digitalcv_domain::payment::PENDING_STATUS;

use crate::domain::repository::{CvRepository, PaymentGateway, PaymentRepository, UserPort};
use crate::domain::types::{ChargeRequest, Payment, Pricing};
use crate::error::CvServiceError;

// ── StartPayment ─────────────────────────────────────────────────────────────

pub struct StartPaymentOutput {
    pub payment_id: PaymentId,
    pub redirect_url: String,
}

pub struct StartPaymentUseCase<U, C, P, G>
where
    U: UserPort,
    C: CvRepository,
    P: PaymentRepository,
    G: PaymentGateway,
{
    pub users: U,
    pub cvs: C,
    pub payments: P,
    pub gateway: G,
    pub pricing: Pricing,
    pub public_base_url: String,
}

impl<U, C, P, G> StartPaymentUseCase<U, C, P, G>
where
    U: UserPort,
    C: CvRepository,
    P: PaymentRepository,
    G: PaymentGateway,
{
    /// Record a `PENDING` payment for the CV, then ask the gateway for a
    /// hosted payment page. The payment row is written before the gateway is
    /// called and stays `PENDING` if the call fails.
    pub async fn execute(
        &self,
        caller: &IdentityHeaders,
        cv_id: Uuid,
    ) -> Result<StartPaymentOutput, CvServiceError> {
        let user = self
            .users
            .find_by_id(caller.user_id)
            .await?
            .ok_or(CvServiceError::UserNotFound)?;
        let cv = self
            .cvs
            .find_by_id(cv_id)
            .await?
            .ok_or(CvServiceError::CvNotFound)?;
        if !caller.may_access(cv.user_id) {
            return Err(CvServiceError::Forbidden);
        }

        let payment_id = PaymentId(Uuid::now_v7());
        let charge = ChargeRequest {
            amount: self.pricing.amount_minor,
            currency: self.pricing.currency.clone(),
            redirect_url: format!("{}/payments/{payment_id}/status", self.public_base_url),
            webhook_url: format!("{}/payments/webhook/{payment_id}", self.public_base_url),
            correlation_token: payment_id.to_string(),
            customer_reference: user.id.to_string(),
        };
        let now = Utc::now();
        let payment = Payment {
            id: payment_id.0,
            user_id: user.id,
            cv_id: Some(cv.id),
            amount: charge.amount,
            currency: charge.currency.clone(),
            gateway_transaction_id: None,
            status: PENDING_STATUS.to_owned(),
            request_payload: serde_json::to_value(&charge).context("serialize charge request")?,
            response_payload: None,
            created_at: now,
            updated_at: now,
        };
        self.payments.create(&payment).await?;

        match self.gateway.create_charge(&charge).await {
            Ok(Some(redirect_url)) => {
                tracing::info!(
                    payment_id = %payment_id,
                    cv_id = %cv.id,
                    amount = payment.amount,
                    currency = %payment.currency,
                    "payment started"
                );
                Ok(StartPaymentOutput {
                    payment_id,
                    redirect_url,
                })
            }
            Ok(None) => {
                tracing::warn!(payment_id = %payment_id, "gateway returned no redirect url");
                Err(CvServiceError::PaymentNotStarted)
            }
            Err(e) => {
                tracing::warn!(payment_id = %payment_id, error = ?e, "gateway charge failed");
                Err(CvServiceError::PaymentNotStarted)
            }
        }
    }
}

// ── GetPayment ───────────────────────────────────────────────────────────────

pub struct GetPaymentUseCase<P: PaymentRepository> {
    pub payments: P,
}

impl<P: PaymentRepository> GetPaymentUseCase<P> {
    pub async fn execute(
        &self,
        caller: &IdentityHeaders,
        id: PaymentId,
    ) -> Result<Payment, CvServiceError> {
        let payment = self
            .payments
            .find_by_id(id.0)
            .await?
            .ok_or(CvServiceError::PaymentNotFound)?;
        if !caller.may_access(payment.user_id) {
            return Err(CvServiceError::Forbidden);
        }
        Ok(payment)
    }
}

// ── GetPaymentStatus ─────────────────────────────────────────────────────────

/// Status lookup for the gateway's post-payment redirect. The browser lands
/// here without identity headers, so only the status is exposed.
pub struct GetPaymentStatusUseCase<P: PaymentRepository> {
    pub payments: P,
}

impl<P: PaymentRepository> GetPaymentStatusUseCase<P> {
    pub async fn execute(&self, id: PaymentId) -> Result<String, CvServiceError> {
        self.payments
            .find_by_id(id.0)
            .await?
            .map(|payment| payment.status)
            .ok_or(CvServiceError::PaymentNotFound)
    }
}
