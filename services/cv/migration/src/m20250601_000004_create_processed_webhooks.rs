use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProcessedWebhooks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProcessedWebhooks::GatewayTransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProcessedWebhooks::State).string().not_null())
                    .col(ColumnDef::new(ProcessedWebhooks::PaymentId).uuid().not_null())
                    .col(
                        ColumnDef::new(ProcessedWebhooks::ProcessedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(ProcessedWebhooks::PaymentId)
                            .col(ProcessedWebhooks::GatewayTransactionId)
                            .col(ProcessedWebhooks::State),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ProcessedWebhooks::Table, ProcessedWebhooks::PaymentId)
                            .to(Payments::Table, Payments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ProcessedWebhooks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ProcessedWebhooks {
    Table,
    GatewayTransactionId,
    State,
    PaymentId,
    ProcessedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
}
