use chrono::Utc;
use uuid::Uuid;

use digitalcv_auth_types::identity::IdentityHeaders;
use digitalcv_domain::cv::{CvState, ValidityWindow, validate_pin, validate_username};

use crate::crypto::{generate_pin, hash_pin, verify_pin};
use crate::domain::repository::{CvRepository, UserPort};
use crate::domain::types::Cv;
use crate::error::CvServiceError;

fn normalize_username(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

// ── CreateCv ─────────────────────────────────────────────────────────────────

pub struct CreateCvInput {
    pub user_id: Uuid,
    pub username: String,
    pub content: serde_json::Value,
}

/// The stored CV plus its raw PIN, which is never persisted.
pub struct CreateCvOutput {
    pub cv: Cv,
    pub pin: String,
}

pub struct CreateCvUseCase<U: UserPort, R: CvRepository> {
    pub users: U,
    pub cvs: R,
}

impl<U: UserPort, R: CvRepository> CreateCvUseCase<U, R> {
    pub async fn execute(&self, input: CreateCvInput) -> Result<CreateCvOutput, CvServiceError> {
        let username = normalize_username(&input.username);
        if !validate_username(&username) {
            return Err(CvServiceError::InvalidUsername);
        }
        if !input.content.is_object() {
            return Err(CvServiceError::InvalidContent);
        }
        self.users
            .find_by_id(input.user_id)
            .await?
            .ok_or(CvServiceError::UserNotFound)?;

        let pin = generate_pin();
        let now = Utc::now();
        let cv = Cv {
            id: Uuid::now_v7(),
            user_id: input.user_id,
            username,
            pin_hash: hash_pin(&pin)?,
            content: input.content,
            state: CvState::Pending,
            window: ValidityWindow::starting_at(now),
            created_at: now,
            updated_at: now,
        };
        self.cvs.create(&cv).await?;
        tracing::info!(cv_id = %cv.id, user_id = %cv.user_id, "cv created");
        Ok(CreateCvOutput { cv, pin })
    }
}

// ── GetCv ────────────────────────────────────────────────────────────────────

pub struct GetCvUseCase<R: CvRepository> {
    pub repo: R,
}

impl<R: CvRepository> GetCvUseCase<R> {
    pub async fn execute(&self, caller: &IdentityHeaders, id: Uuid) -> Result<Cv, CvServiceError> {
        let cv = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(CvServiceError::CvNotFound)?;
        if !caller.may_access(cv.user_id) {
            return Err(CvServiceError::Forbidden);
        }
        Ok(cv)
    }
}

// ── ListMyCvs ────────────────────────────────────────────────────────────────

pub struct ListMyCvsUseCase<R: CvRepository> {
    pub repo: R,
}

impl<R: CvRepository> ListMyCvsUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Cv>, CvServiceError> {
        self.repo.list_by_user(user_id).await
    }
}

// ── DeleteCv ─────────────────────────────────────────────────────────────────

pub struct DeleteCvUseCase<R: CvRepository> {
    pub repo: R,
}

impl<R: CvRepository> DeleteCvUseCase<R> {
    pub async fn execute(&self, caller: &IdentityHeaders, id: Uuid) -> Result<(), CvServiceError> {
        let cv = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(CvServiceError::CvNotFound)?;
        if !caller.may_access(cv.user_id) {
            return Err(CvServiceError::Forbidden);
        }
        if !self.repo.delete(id).await? {
            return Err(CvServiceError::CvNotFound);
        }
        tracing::info!(cv_id = %id, deleted_by = %caller.user_id, "cv deleted");
        Ok(())
    }
}

// ── ViewPublicCv ─────────────────────────────────────────────────────────────

/// Username + PIN access to a CV's content.
///
/// Credential failures all collapse into `InvalidCredentials`; a correct PIN
/// on an inactive or expired CV yields `CvNotActive`.
pub struct ViewPublicCvUseCase<R: CvRepository> {
    pub repo: R,
}

impl<R: CvRepository> ViewPublicCvUseCase<R> {
    pub async fn execute(&self, username: &str, pin: &str) -> Result<Cv, CvServiceError> {
        if !validate_pin(pin) {
            return Err(CvServiceError::InvalidCredentials);
        }
        let cv = self
            .repo
            .find_by_username(&normalize_username(username))
            .await?
            .ok_or(CvServiceError::InvalidCredentials)?;
        if !verify_pin(pin, &cv.pin_hash)? {
            return Err(CvServiceError::InvalidCredentials);
        }
        if !cv.is_viewable_at(Utc::now()) {
            return Err(CvServiceError::CvNotActive);
        }
        Ok(cv)
    }
}
