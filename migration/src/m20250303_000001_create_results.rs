use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_accounts::{Sections, Users};
use crate::m20250302_000001_create_evaluations::EvaluationPeriods;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建评估结果表
        manager
            .create_table(
                Table::create()
                    .table(EvaluationResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationResults::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EvaluationResults::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(EvaluationResults::EvaluationPeriodId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvaluationResults::SectionId).big_integer().null())
                    .col(ColumnDef::new(EvaluationResults::CategoryAScore).double().not_null())
                    .col(ColumnDef::new(EvaluationResults::CategoryBScore).double().not_null())
                    .col(ColumnDef::new(EvaluationResults::CategoryCScore).double().not_null())
                    .col(ColumnDef::new(EvaluationResults::CategoryDScore).double().not_null())
                    .col(ColumnDef::new(EvaluationResults::TotalPercentage).double().not_null())
                    .col(ColumnDef::new(EvaluationResults::AverageRating).double().not_null())
                    .col(ColumnDef::new(EvaluationResults::TotalResponses).integer().not_null())
                    .col(ColumnDef::new(EvaluationResults::PoorCount).integer().not_null())
                    .col(
                        ColumnDef::new(EvaluationResults::UnsatisfactoryCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResults::SatisfactoryCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResults::VerySatisfactoryCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResults::OutstandingCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResults::CalculatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationResults::Table, EvaluationResults::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationResults::Table, EvaluationResults::EvaluationPeriodId)
                            .to(EvaluationPeriods::Table, EvaluationPeriods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationResults::Table, EvaluationResults::SectionId)
                            .to(Sections::Table, Sections::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评估历史表（周期结束时的快照）
        manager
            .create_table(
                Table::create()
                    .table(EvaluationHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationHistory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EvaluationHistory::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(EvaluationHistory::EvaluationPeriodId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvaluationHistory::SectionId).big_integer().null())
                    .col(ColumnDef::new(EvaluationHistory::EvaluationType).string().not_null())
                    .col(ColumnDef::new(EvaluationHistory::PeriodName).string().not_null())
                    .col(ColumnDef::new(EvaluationHistory::PeriodStart).big_integer().not_null())
                    .col(ColumnDef::new(EvaluationHistory::PeriodEnd).big_integer().not_null())
                    .col(ColumnDef::new(EvaluationHistory::CategoryAScore).double().not_null())
                    .col(ColumnDef::new(EvaluationHistory::CategoryBScore).double().not_null())
                    .col(ColumnDef::new(EvaluationHistory::CategoryCScore).double().not_null())
                    .col(ColumnDef::new(EvaluationHistory::CategoryDScore).double().not_null())
                    .col(ColumnDef::new(EvaluationHistory::TotalPercentage).double().not_null())
                    .col(ColumnDef::new(EvaluationHistory::AverageRating).double().not_null())
                    .col(ColumnDef::new(EvaluationHistory::TotalResponses).integer().not_null())
                    .col(ColumnDef::new(EvaluationHistory::PoorCount).integer().not_null())
                    .col(
                        ColumnDef::new(EvaluationHistory::UnsatisfactoryCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationHistory::SatisfactoryCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationHistory::VerySatisfactoryCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationHistory::OutstandingCount)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvaluationHistory::ArchivedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationHistory::Table, EvaluationHistory::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评估未通过记录表
        manager
            .create_table(
                Table::create()
                    .table(EvaluationFailureLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationFailureLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EvaluationFailureLogs::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationFailureLogs::EvaluationPeriodId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(EvaluationFailureLogs::Score).double().not_null())
                    .col(
                        ColumnDef::new(EvaluationFailureLogs::PassingScore)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationFailureLogs::EvaluationDate)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationFailureLogs::Table, EvaluationFailureLogs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建 AI 建议表
        manager
            .create_table(
                Table::create()
                    .table(AiRecommendations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AiRecommendations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AiRecommendations::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(AiRecommendations::EvaluationPeriodId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AiRecommendations::Title).string().not_null())
                    .col(ColumnDef::new(AiRecommendations::Description).text().not_null())
                    .col(ColumnDef::new(AiRecommendations::Priority).string().not_null())
                    .col(ColumnDef::new(AiRecommendations::Reason).text().null())
                    .col(
                        ColumnDef::new(AiRecommendations::EvaluationType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AiRecommendations::SectionCode).string().null())
                    .col(ColumnDef::new(AiRecommendations::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(AiRecommendations::Table, AiRecommendations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(AiRecommendations::Table, AiRecommendations::EvaluationPeriodId)
                            .to(EvaluationPeriods::Table, EvaluationPeriods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluation_results_user_period")
                    .table(EvaluationResults::Table)
                    .col(EvaluationResults::UserId)
                    .col(EvaluationResults::EvaluationPeriodId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluation_history_user")
                    .table(EvaluationHistory::Table)
                    .col(EvaluationHistory::UserId)
                    .col(EvaluationHistory::ArchivedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluation_failure_logs_user")
                    .table(EvaluationFailureLogs::Table)
                    .col(EvaluationFailureLogs::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ai_recommendations_user_period")
                    .table(AiRecommendations::Table)
                    .col(AiRecommendations::UserId)
                    .col(AiRecommendations::EvaluationPeriodId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiRecommendations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationFailureLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationResults::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum EvaluationResults {
    #[sea_orm(iden = "evaluation_results")]
    Table,
    Id,
    UserId,
    EvaluationPeriodId,
    SectionId,
    CategoryAScore,
    CategoryBScore,
    CategoryCScore,
    CategoryDScore,
    TotalPercentage,
    AverageRating,
    TotalResponses,
    PoorCount,
    UnsatisfactoryCount,
    SatisfactoryCount,
    VerySatisfactoryCount,
    OutstandingCount,
    CalculatedAt,
}

#[derive(DeriveIden)]
enum EvaluationHistory {
    #[sea_orm(iden = "evaluation_history")]
    Table,
    Id,
    UserId,
    EvaluationPeriodId,
    SectionId,
    EvaluationType,
    PeriodName,
    PeriodStart,
    PeriodEnd,
    CategoryAScore,
    CategoryBScore,
    CategoryCScore,
    CategoryDScore,
    TotalPercentage,
    AverageRating,
    TotalResponses,
    PoorCount,
    UnsatisfactoryCount,
    SatisfactoryCount,
    VerySatisfactoryCount,
    OutstandingCount,
    ArchivedAt,
}

#[derive(DeriveIden)]
enum EvaluationFailureLogs {
    #[sea_orm(iden = "evaluation_failure_logs")]
    Table,
    Id,
    UserId,
    EvaluationPeriodId,
    Score,
    PassingScore,
    EvaluationDate,
}

#[derive(DeriveIden)]
enum AiRecommendations {
    #[sea_orm(iden = "ai_recommendations")]
    Table,
    Id,
    UserId,
    EvaluationPeriodId,
    Title,
    Description,
    Priority,
    Reason,
    EvaluationType,
    SectionCode,
    CreatedAt,
}
