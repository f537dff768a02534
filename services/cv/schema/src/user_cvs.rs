use sea_orm::entity::prelude::*;

/// Generated digital CV with its access credentials and activation state.
///
/// `user_id` is a loose reference: the owning user may no longer exist.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "user_cvs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    /// Argon2id PHC string; the raw PIN is never stored.
    pub pin_hash: String,
    pub content: Json,
    /// "pending" | "active" | "deactive"
    pub state: String,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
