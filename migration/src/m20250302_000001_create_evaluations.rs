use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_accounts::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建评估周期表
        manager
            .create_table(
                Table::create()
                    .table(EvaluationPeriods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationPeriods::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EvaluationPeriods::Name).string().not_null())
                    .col(
                        ColumnDef::new(EvaluationPeriods::EvaluationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationPeriods::StartDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationPeriods::EndDate)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationPeriods::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EvaluationPeriods::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评估发布开关表（每种评估类型一行）
        manager
            .create_table(
                Table::create()
                    .table(Evaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Evaluations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::EvaluationType)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::IsReleased)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Evaluations::EvaluationPeriodId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Evaluations::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Evaluations::Table, Evaluations::EvaluationPeriodId)
                            .to(EvaluationPeriods::Table, EvaluationPeriods::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评估题目表
        manager
            .create_table(
                Table::create()
                    .table(EvaluationQuestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationQuestions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EvaluationQuestions::EvaluationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationQuestions::QuestionNumber)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationQuestions::QuestionText)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationQuestions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(EvaluationQuestions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评估答卷表
        manager
            .create_table(
                Table::create()
                    .table(EvaluationResponses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EvaluationResponses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResponses::EvaluatorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResponses::EvaluateeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResponses::EvaluationPeriodId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResponses::EvaluationType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResponses::StudentNumber)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResponses::StudentSection)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(EvaluationResponses::Comments).text().null())
                    .col(
                        ColumnDef::new(EvaluationResponses::Ratings)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EvaluationResponses::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationResponses::Table, EvaluationResponses::EvaluatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(EvaluationResponses::Table, EvaluationResponses::EvaluateeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                EvaluationResponses::Table,
                                EvaluationResponses::EvaluationPeriodId,
                            )
                            .to(EvaluationPeriods::Table, EvaluationPeriods::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建非正常班学生评估表
        manager
            .create_table(
                Table::create()
                    .table(IrregularEvaluations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IrregularEvaluations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IrregularEvaluations::EvaluatorId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IrregularEvaluations::EvaluateeId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IrregularEvaluations::EvaluationPeriodId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IrregularEvaluations::StudentNumber)
                            .string()
                            .null(),
                    )
                    .col(ColumnDef::new(IrregularEvaluations::Comments).text().null())
                    .col(
                        ColumnDef::new(IrregularEvaluations::Ratings)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IrregularEvaluations::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(IrregularEvaluations::Table, IrregularEvaluations::EvaluatorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(IrregularEvaluations::Table, IrregularEvaluations::EvaluateeId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                IrregularEvaluations::Table,
                                IrregularEvaluations::EvaluationPeriodId,
                            )
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
                    .name("idx_evaluation_periods_type_active")
                    .table(EvaluationPeriods::Table)
                    .col(EvaluationPeriods::EvaluationType)
                    .col(EvaluationPeriods::IsActive)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluation_questions_type_number")
                    .table(EvaluationQuestions::Table)
                    .col(EvaluationQuestions::EvaluationType)
                    .col(EvaluationQuestions::QuestionNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluation_responses_unique")
                    .table(EvaluationResponses::Table)
                    .col(EvaluationResponses::EvaluatorId)
                    .col(EvaluationResponses::EvaluateeId)
                    .col(EvaluationResponses::EvaluationPeriodId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_evaluation_responses_evaluatee")
                    .table(EvaluationResponses::Table)
                    .col(EvaluationResponses::EvaluateeId)
                    .col(EvaluationResponses::EvaluationPeriodId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_irregular_evaluations_unique")
                    .table(IrregularEvaluations::Table)
                    .col(IrregularEvaluations::EvaluatorId)
                    .col(IrregularEvaluations::EvaluateeId)
                    .col(IrregularEvaluations::EvaluationPeriodId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IrregularEvaluations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationResponses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Evaluations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EvaluationPeriods::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum EvaluationPeriods {
    #[sea_orm(iden = "evaluation_periods")]
    Table,
    Id,
    Name,
    EvaluationType,
    StartDate,
    EndDate,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Evaluations {
    #[sea_orm(iden = "evaluations")]
    Table,
    Id,
    EvaluationType,
    IsReleased,
    EvaluationPeriodId,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EvaluationQuestions {
    #[sea_orm(iden = "evaluation_questions")]
    Table,
    Id,
    EvaluationType,
    QuestionNumber,
    QuestionText,
    IsActive,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EvaluationResponses {
    #[sea_orm(iden = "evaluation_responses")]
    Table,
    Id,
    EvaluatorId,
    EvaluateeId,
    EvaluationPeriodId,
    EvaluationType,
    StudentNumber,
    StudentSection,
    Comments,
    Ratings,
    SubmittedAt,
}

#[derive(DeriveIden)]
enum IrregularEvaluations {
    #[sea_orm(iden = "irregular_evaluations")]
    Table,
    Id,
    EvaluatorId,
    EvaluateeId,
    EvaluationPeriodId,
    StudentNumber,
    Comments,
    Ratings,
    SubmittedAt,
}
