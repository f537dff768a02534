use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use digitalcv_cv::crypto::{hash_pin, sign_webhook};
use digitalcv_cv::domain::repository::{
    CvRepository, Notifier, PaymentGateway, PaymentRepository, UserPort,
};
use digitalcv_cv::domain::types::{
    ChargeRequest, CredentialsEmail, Cv, CvOwner, Payment, Pricing, ReconcileCommand,
    ReconcileOutcome, WebhookNotification,
};
use digitalcv_cv::error::CvServiceError;
use digitalcv_cv::usecase::webhook::{HandleWebhookUseCase, parse_webhook};
use digitalcv_domain::cv::{CvState, ValidityWindow};
use digitalcv_domain::payment::{NotifyPolicy, PENDING_STATUS};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test";
pub const TEST_PUBLIC_BASE_URL: &str = "https://cv.example.com";
pub const TEST_PIN: &str = "0421";

// ── MockUserPort ─────────────────────────────────────────────────────────────

pub struct MockUserPort {
    pub users: Vec<CvOwner>,
}

impl MockUserPort {
    pub fn new(users: Vec<CvOwner>) -> Self {
        Self { users }
    }

    pub fn empty() -> Self {
        Self { users: vec![] }
    }
}

impl UserPort for MockUserPort {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CvOwner>, CvServiceError> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }
}

// ── MockCvRepo ───────────────────────────────────────────────────────────────

pub struct MockCvRepo {
    pub cvs: Arc<Mutex<Vec<Cv>>>,
}

impl MockCvRepo {
    pub fn new(cvs: Vec<Cv>) -> Self {
        Self {
            cvs: Arc::new(Mutex::new(cvs)),
        }
    }

    pub fn shared(cvs: &Arc<Mutex<Vec<Cv>>>) -> Self {
        Self {
            cvs: Arc::clone(cvs),
        }
    }
}

impl CvRepository for MockCvRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cv>, CvServiceError> {
        Ok(self.cvs.lock().unwrap().iter().find(|c| c.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Cv>, CvServiceError> {
        Ok(self
            .cvs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.username == username)
            .cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Cv>, CvServiceError> {
        let mut cvs: Vec<Cv> = self
            .cvs
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        cvs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cvs)
    }

    async fn create(&self, cv: &Cv) -> Result<(), CvServiceError> {
        let mut cvs = self.cvs.lock().unwrap();
        if cvs.iter().any(|c| c.username == cv.username) {
            return Err(CvServiceError::UsernameTaken);
        }
        cvs.push(cv.clone());
        Ok(())
    }

    async fn update_pin_hash(&self, id: Uuid, pin_hash: &str) -> Result<bool, CvServiceError> {
        let mut cvs = self.cvs.lock().unwrap();
        match cvs.iter_mut().find(|c| c.id == id) {
            Some(cv) => {
                cv.pin_hash = pin_hash.to_owned();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CvServiceError> {
        let mut cvs = self.cvs.lock().unwrap();
        let before = cvs.len();
        cvs.retain(|c| c.id != id);
        Ok(cvs.len() < before)
    }
}

// ── MockPaymentRepo ──────────────────────────────────────────────────────────

/// (payment id, gateway transaction id, normalized state).
pub type LedgerKey = (Uuid, String, String);

/// Shares the CV list with [`MockCvRepo`] so reconciliation is visible to both.
pub struct MockPaymentRepo {
    pub payments: Arc<Mutex<Vec<Payment>>>,
    pub cvs: Arc<Mutex<Vec<Cv>>>,
    pub ledger: Arc<Mutex<HashSet<LedgerKey>>>,
}

impl PaymentRepository for MockPaymentRepo {
    async fn create(&self, payment: &Payment) -> Result<(), CvServiceError> {
        self.payments.lock().unwrap().push(payment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, CvServiceError> {
        Ok(self
            .payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn reconcile(
        &self,
        command: &ReconcileCommand,
    ) -> Result<ReconcileOutcome, CvServiceError> {
        let now = Utc::now();
        {
            let mut payments = self.payments.lock().unwrap();
            let payment = payments
                .iter_mut()
                .find(|p| p.id == command.payment_id)
                .ok_or_else(|| anyhow::anyhow!("payment {} missing", command.payment_id))?;
            if payment.gateway_transaction_id.as_deref()
                == Some(command.gateway_transaction_id.as_str())
                && payment.status.trim().to_ascii_lowercase() == command.normalized_status
            {
                return Ok(ReconcileOutcome::Duplicate);
            }
            payment.gateway_transaction_id = Some(command.gateway_transaction_id.clone());
            payment.status = command.status.clone();
            payment.response_payload = Some(command.raw_payload.clone());
            payment.updated_at = now;
        }
        self.ledger.lock().unwrap().insert((
            command.payment_id,
            command.gateway_transaction_id.clone(),
            command.normalized_status.clone(),
        ));

        let cv = match (command.cv_id, command.target_cv_state) {
            (Some(cv_id), Some(state)) => {
                let mut cvs = self.cvs.lock().unwrap();
                cvs.iter_mut().find(|c| c.id == cv_id).map(|cv| {
                    cv.state = state;
                    cv.updated_at = now;
                    cv.clone()
                })
            }
            _ => None,
        };
        Ok(ReconcileOutcome::Applied { cv })
    }
}

// ── MockGateway ──────────────────────────────────────────────────────────────

pub enum GatewayReply {
    Url(&'static str),
    NoUrl,
    Error,
}

pub struct MockGateway {
    pub reply: GatewayReply,
    pub requests: Arc<Mutex<Vec<ChargeRequest>>>,
}

impl MockGateway {
    pub fn new(reply: GatewayReply) -> Self {
        Self {
            reply,
            requests: Arc::new(Mutex::new(vec![])),
        }
    }
}

impl PaymentGateway for MockGateway {
    async fn create_charge(
        &self,
        request: &ChargeRequest,
    ) -> Result<Option<String>, CvServiceError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.reply {
            GatewayReply::Url(url) => Ok(Some(url.to_owned())),
            GatewayReply::NoUrl => Ok(None),
            GatewayReply::Error => Err(anyhow::anyhow!("connection refused").into()),
        }
    }
}

// ── MockNotifier ─────────────────────────────────────────────────────────────

pub struct MockNotifier {
    pub sent: Arc<Mutex<Vec<CredentialsEmail>>>,
    pub fail: bool,
}

impl Notifier for MockNotifier {
    async fn send_credentials(&self, email: &CredentialsEmail) -> Result<(), CvServiceError> {
        self.sent.lock().unwrap().push(email.clone());
        if self.fail {
            return Err(anyhow::anyhow!("mail api unavailable").into());
        }
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_owner() -> CvOwner {
    CvOwner {
        id: Uuid::now_v7(),
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
    }
}

pub fn test_cv(user_id: Uuid, username: &str) -> Cv {
    let now = Utc::now();
    Cv {
        id: Uuid::now_v7(),
        user_id,
        username: username.to_owned(),
        pin_hash: hash_pin(TEST_PIN).unwrap(),
        content: serde_json::json!({"name": "Ada Lovelace"}),
        state: CvState::Pending,
        window: ValidityWindow::starting_at(now - Duration::minutes(1)),
        created_at: now,
        updated_at: now,
    }
}

pub fn test_payment(user_id: Uuid, cv_id: Option<Uuid>) -> Payment {
    let now = Utc::now();
    Payment {
        id: Uuid::now_v7(),
        user_id,
        cv_id,
        amount: 250_000,
        currency: "LKR".into(),
        gateway_transaction_id: None,
        status: PENDING_STATUS.to_owned(),
        request_payload: serde_json::json!({}),
        response_payload: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn test_pricing() -> Pricing {
    Pricing {
        amount_minor: 250_000,
        currency: "LKR".into(),
    }
}

/// Webhook as the gateway would send it, signed with [`TEST_WEBHOOK_SECRET`].
pub fn signed_webhook(token: &str, transaction_id: &str, state: &str) -> WebhookNotification {
    let signature = sign_webhook(TEST_WEBHOOK_SECRET, token, transaction_id, state).unwrap();
    parse_webhook(
        None,
        serde_json::json!({
            "correlation_token": token,
            "gateway_transaction_id": transaction_id,
            "state": state,
            "signature": signature,
            "amount": 250000
        }),
    )
    .unwrap()
}

/// In-memory store with one owner, one CV and one pending payment for it.
pub struct World {
    pub owner: CvOwner,
    pub cv: Cv,
    pub payment: Payment,
    pub users: Vec<CvOwner>,
    pub cvs: Arc<Mutex<Vec<Cv>>>,
    pub payments: Arc<Mutex<Vec<Payment>>>,
    pub ledger: Arc<Mutex<HashSet<LedgerKey>>>,
    pub sent: Arc<Mutex<Vec<CredentialsEmail>>>,
}

impl World {
    pub fn new() -> Self {
        let owner = test_owner();
        let cv = test_cv(owner.id, "ada");
        let payment = test_payment(owner.id, Some(cv.id));
        Self {
            users: vec![owner.clone()],
            cvs: Arc::new(Mutex::new(vec![cv.clone()])),
            payments: Arc::new(Mutex::new(vec![payment.clone()])),
            ledger: Arc::new(Mutex::new(HashSet::new())),
            sent: Arc::new(Mutex::new(vec![])),
            owner,
            cv,
            payment,
        }
    }

    pub fn token(&self) -> String {
        self.payment.id.to_string()
    }

    pub fn payment_repo(&self) -> MockPaymentRepo {
        MockPaymentRepo {
            payments: Arc::clone(&self.payments),
            cvs: Arc::clone(&self.cvs),
            ledger: Arc::clone(&self.ledger),
        }
    }

    pub fn webhook_usecase(
        &self,
        policy: NotifyPolicy,
    ) -> HandleWebhookUseCase<MockUserPort, MockCvRepo, MockPaymentRepo, MockNotifier> {
        self.webhook_usecase_with(policy, false)
    }

    pub fn webhook_usecase_with(
        &self,
        policy: NotifyPolicy,
        mail_fails: bool,
    ) -> HandleWebhookUseCase<MockUserPort, MockCvRepo, MockPaymentRepo, MockNotifier> {
        HandleWebhookUseCase {
            users: MockUserPort::new(self.users.clone()),
            cvs: MockCvRepo::shared(&self.cvs),
            payments: self.payment_repo(),
            notifier: MockNotifier {
                sent: Arc::clone(&self.sent),
                fail: mail_fails,
            },
            webhook_secret: TEST_WEBHOOK_SECRET.to_owned(),
            notify_policy: policy,
        }
    }

    pub fn stored_cv(&self) -> Option<Cv> {
        self.cvs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == self.cv.id)
            .cloned()
    }

    pub fn stored_payment(&self) -> Payment {
        self.payments
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == self.payment.id)
            .cloned()
            .unwrap()
    }

    pub fn sent_emails(&self) -> Vec<CredentialsEmail> {
        self.sent.lock().unwrap().clone()
    }
}
