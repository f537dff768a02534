use sea_orm::DatabaseConnection;

use digitalcv_domain::payment::NotifyPolicy;

use crate::domain::types::Pricing;
use crate::infra::db::{DbCvRepository, DbPaymentRepository, DbUserPort};
use crate::infra::gateway::HttpPaymentGateway;
use crate::infra::mailer::HttpMailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub gateway: HttpPaymentGateway,
    pub mailer: HttpMailer,
    pub pricing: Pricing,
    /// Base for the redirect and webhook URLs handed to the gateway.
    pub public_base_url: String,
    pub webhook_secret: String,
    pub notify_policy: NotifyPolicy,
}

impl AppState {
    pub fn user_port(&self) -> DbUserPort {
        DbUserPort {
            db: self.db.clone(),
        }
    }

    pub fn cv_repo(&self) -> DbCvRepository {
        DbCvRepository {
            db: self.db.clone(),
        }
    }

    pub fn payment_repo(&self) -> DbPaymentRepository {
        DbPaymentRepository {
            db: self.db.clone(),
        }
    }

    pub fn gateway(&self) -> HttpPaymentGateway {
        self.gateway.clone()
    }

    pub fn notifier(&self) -> HttpMailer {
        self.mailer.clone()
    }
}
