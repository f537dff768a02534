use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // No foreign key on user_id: users belong to the identity provider and
        // may disappear independently.
        manager
            .create_table(
                Table::create()
                    .table(UserCvs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserCvs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(UserCvs::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(UserCvs::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserCvs::PinHash).string().not_null())
                    .col(ColumnDef::new(UserCvs::Content).json_binary().not_null())
                    .col(
                        ColumnDef::new(UserCvs::State)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(UserCvs::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserCvs::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserCvs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserCvs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(UserCvs::Table)
                    .col(UserCvs::UserId)
                    .col(UserCvs::CreatedAt)
                    .name("idx_user_cvs_user_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserCvs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserCvs {
    Table,
    Id,
    UserId,
    Username,
    PinHash,
    Content,
    State,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}
