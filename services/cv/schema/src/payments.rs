use sea_orm::entity::prelude::*;

/// One attempt to pay for CV activation.
///
/// `status` holds the gateway's status string as received.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub cv_id: Option<Uuid>,
    pub amount: i64,
    pub currency: String,
    pub gateway_transaction_id: Option<String>,
    pub status: String,
    pub request_payload: Json,
    pub response_payload: Option<Json>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
