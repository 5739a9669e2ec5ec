use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_accounts::{Sections, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 管理员操作日志表
        manager
            .create_table(
                Table::create()
                    .table(AdminActivityLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminActivityLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminActivityLogs::AdminId).big_integer().null())
                    .col(ColumnDef::new(AdminActivityLogs::Action).string().not_null())
                    .col(
                        ColumnDef::new(AdminActivityLogs::TargetUserId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AdminActivityLogs::TargetSectionId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(AdminActivityLogs::Description)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AdminActivityLogs::IpAddress).string().null())
                    .col(
                        ColumnDef::new(AdminActivityLogs::Timestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AdminActivityLogs::Table, AdminActivityLogs::AdminId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AdminActivityLogs::Table, AdminActivityLogs::TargetUserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AdminActivityLogs::Table, AdminActivityLogs::TargetSectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admin_activity_logs_timestamp")
                    .table(AdminActivityLogs::Table)
                    .col(AdminActivityLogs::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_admin_activity_logs_action")
                    .table(AdminActivityLogs::Table)
                    .col(AdminActivityLogs::Action)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AdminActivityLogs::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum AdminActivityLogs {
    #[sea_orm(iden = "admin_activity_logs")]
    Table,
    Id,
    AdminId,
    Action,
    TargetUserId,
    TargetSectionId,
    Description,
    IpAddress,
    Timestamp,
}
