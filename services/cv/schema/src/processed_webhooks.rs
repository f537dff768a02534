use sea_orm::entity::prelude::*;

/// Audit ledger of applied gateway webhooks. One row per
/// (payment, gateway transaction id, normalized state), stamped with the first
/// time that triple was applied.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "processed_webhooks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub payment_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub gateway_transaction_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub state: String,
    pub processed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
