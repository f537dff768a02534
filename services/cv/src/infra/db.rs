use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use digitalcv_cv_schema::{payments, processed_webhooks, user_cvs, users};
use digitalcv_domain::cv::{CvState, ValidityWindow};

use crate::domain::repository::{CvRepository, PaymentRepository, UserPort};
use crate::domain::types::{Cv, CvOwner, Payment, ReconcileCommand, ReconcileOutcome};
use crate::error::CvServiceError;

// ── User port ────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserPort {
    pub db: DatabaseConnection,
}

impl UserPort for DbUserPort {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<CvOwner>, CvServiceError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(|m| CvOwner {
            id: m.id,
            name: m.name,
            email: m.email,
        }))
    }
}

// ── CV repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbCvRepository {
    pub db: DatabaseConnection,
}

impl CvRepository for DbCvRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Cv>, CvServiceError> {
        let model = user_cvs::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find cv by id")?;
        model.map(cv_from_model).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Cv>, CvServiceError> {
        let model = user_cvs::Entity::find()
            .filter(user_cvs::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find cv by username")?;
        model.map(cv_from_model).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Cv>, CvServiceError> {
        let models = user_cvs::Entity::find()
            .filter(user_cvs::Column::UserId.eq(user_id))
            .order_by_desc(user_cvs::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list cvs by user")?;
        models.into_iter().map(cv_from_model).collect()
    }

    async fn create(&self, cv: &Cv) -> Result<(), CvServiceError> {
        let result = user_cvs::ActiveModel {
            id: Set(cv.id),
            user_id: Set(cv.user_id),
            username: Set(cv.username.clone()),
            pin_hash: Set(cv.pin_hash.clone()),
            content: Set(cv.content.clone()),
            state: Set(cv.state.as_str().to_owned()),
            start_date: Set(cv.window.start),
            end_date: Set(cv.window.end),
            created_at: Set(cv.created_at),
            updated_at: Set(cv.updated_at),
        }
        .insert(&self.db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(CvServiceError::UsernameTaken)
            }
            Err(e) => Err(anyhow::Error::new(e).context("create cv").into()),
        }
    }

    async fn update_pin_hash(&self, id: Uuid, pin_hash: &str) -> Result<bool, CvServiceError> {
        let result = user_cvs::Entity::update_many()
            .filter(user_cvs::Column::Id.eq(id))
            .col_expr(user_cvs::Column::PinHash, Expr::value(pin_hash))
            .col_expr(user_cvs::Column::UpdatedAt, Expr::value(Utc::now()))
            .exec(&self.db)
            .await
            .context("update cv pin hash")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CvServiceError> {
        let result = user_cvs::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete cv")?;
        Ok(result.rows_affected > 0)
    }
}

fn cv_from_model(model: user_cvs::Model) -> Result<Cv, CvServiceError> {
    let state: CvState = model
        .state
        .parse()
        .with_context(|| format!("cv {} has invalid stored state", model.id))?;
    Ok(Cv {
        id: model.id,
        user_id: model.user_id,
        username: model.username,
        pin_hash: model.pin_hash,
        content: model.content,
        state,
        window: ValidityWindow {
            start: model.start_date,
            end: model.end_date,
        },
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── Payment repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPaymentRepository {
    pub db: DatabaseConnection,
}

impl PaymentRepository for DbPaymentRepository {
    async fn create(&self, payment: &Payment) -> Result<(), CvServiceError> {
        payments::ActiveModel {
            id: Set(payment.id),
            user_id: Set(payment.user_id),
            cv_id: Set(payment.cv_id),
            amount: Set(payment.amount),
            currency: Set(payment.currency.clone()),
            gateway_transaction_id: Set(payment.gateway_transaction_id.clone()),
            status: Set(payment.status.clone()),
            request_payload: Set(payment.request_payload.clone()),
            response_payload: Set(payment.response_payload.clone()),
            created_at: Set(payment.created_at),
            updated_at: Set(payment.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create payment")?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>, CvServiceError> {
        let model = payments::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find payment by id")?;
        Ok(model.map(payment_from_model))
    }

    async fn reconcile(
        &self,
        command: &ReconcileCommand,
    ) -> Result<ReconcileOutcome, CvServiceError> {
        let command = command.clone();
        let outcome = self
            .db
            .transaction::<_, Option<Option<user_cvs::Model>>, DbErr>(|txn| {
                Box::pin(async move {
                    let current = payments::Entity::find_by_id(command.payment_id)
                        .lock_exclusive()
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            DbErr::RecordNotFound(format!("payment {}", command.payment_id))
                        })?;
                    if already_applied(&current, &command) {
                        return Ok(None);
                    }
                    update_payment(txn, &command).await?;
                    record_webhook(txn, &command).await?;
                    let cv = match (command.cv_id, command.target_cv_state) {
                        (Some(cv_id), Some(state)) => update_cv_state(txn, cv_id, state).await?,
                        _ => None,
                    };
                    Ok(Some(cv))
                })
            })
            .await
            .context("reconcile payment webhook")?;

        match outcome {
            None => Ok(ReconcileOutcome::Duplicate),
            Some(cv) => Ok(ReconcileOutcome::Applied {
                cv: cv.map(cv_from_model).transpose()?,
            }),
        }
    }
}

/// The payment already carries this transaction id and normalized state.
fn already_applied(current: &payments::Model, command: &ReconcileCommand) -> bool {
    current.gateway_transaction_id.as_deref() == Some(command.gateway_transaction_id.as_str())
        && current.status.trim().to_ascii_lowercase() == command.normalized_status
}

/// Append to the audit ledger. Keeps the first time each
/// (payment, transaction id, state) triple was applied.
async fn record_webhook(
    txn: &DatabaseTransaction,
    command: &ReconcileCommand,
) -> Result<(), DbErr> {
    processed_webhooks::Entity::insert(processed_webhooks::ActiveModel {
        payment_id: Set(command.payment_id),
        gateway_transaction_id: Set(command.gateway_transaction_id.clone()),
        state: Set(command.normalized_status.clone()),
        processed_at: Set(Utc::now()),
    })
    .on_conflict(
        OnConflict::columns([
            processed_webhooks::Column::PaymentId,
            processed_webhooks::Column::GatewayTransactionId,
            processed_webhooks::Column::State,
        ])
        .do_nothing()
        .to_owned(),
    )
    .exec_without_returning(txn)
    .await?;
    Ok(())
}

async fn update_payment(
    txn: &DatabaseTransaction,
    command: &ReconcileCommand,
) -> Result<(), DbErr> {
    payments::ActiveModel {
        id: Set(command.payment_id),
        gateway_transaction_id: Set(Some(command.gateway_transaction_id.clone())),
        status: Set(command.status.clone()),
        response_payload: Set(Some(command.raw_payload.clone())),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .update(txn)
    .await?;
    Ok(())
}

/// Set a CV's state. A missing CV is tolerated and yields `None`.
async fn update_cv_state(
    txn: &DatabaseTransaction,
    cv_id: Uuid,
    state: CvState,
) -> Result<Option<user_cvs::Model>, DbErr> {
    let Some(model) = user_cvs::Entity::find_by_id(cv_id).one(txn).await? else {
        return Ok(None);
    };
    let mut active: user_cvs::ActiveModel = model.into();
    active.state = Set(state.as_str().to_owned());
    active.updated_at = Set(Utc::now());
    let updated = active.update(txn).await?;
    Ok(Some(updated))
}

fn payment_from_model(model: payments::Model) -> Payment {
    Payment {
        id: model.id,
        user_id: model.user_id,
        cv_id: model.cv_id,
        amount: model.amount,
        currency: model.currency,
        gateway_transaction_id: model.gateway_transaction_id,
        status: model.status,
        request_payload: model.request_payload,
        response_payload: model.response_payload,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
