//! 评估题目存储操作

use super::SeaOrmStorage;
use crate::entity::evaluation_questions::{ActiveModel, Column, Entity as EvaluationQuestions};
use crate::errors::{EdulyticsError, Result};
use crate::models::evaluations::entities::{EvaluationQuestion, EvaluationType};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 按题号列出题目
    pub async fn list_questions_impl(
        &self,
        evaluation_type: EvaluationType,
        active_only: bool,
    ) -> Result<Vec<EvaluationQuestion>> {
        let mut select = EvaluationQuestions::find()
            .filter(Column::EvaluationType.eq(evaluation_type.to_string()));

        if active_only {
            select = select.filter(Column::IsActive.eq(true));
        }

        let questions = select
            .order_by_asc(Column::QuestionNumber)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估题目失败: {e}")))?;

        Ok(questions.into_iter().map(|m| m.into_question()).collect())
    }

    /// 通过 ID 获取题目
    pub async fn get_question_by_id_impl(&self, id: i64) -> Result<Option<EvaluationQuestion>> {
        let result = EvaluationQuestions::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估题目失败: {e}")))?;

        Ok(result.map(|m| m.into_question()))
    }

    /// 写入题目
    pub async fn upsert_question_impl(
        &self,
        evaluation_type: EvaluationType,
        question_number: i32,
        question_text: &str,
    ) -> Result<EvaluationQuestion> {
        let now = chrono::Utc::now().timestamp();

        let existing = EvaluationQuestions::find()
            .filter(Column::EvaluationType.eq(evaluation_type.to_string()))
            .filter(Column::QuestionNumber.eq(question_number))
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估题目失败: {e}")))?;

        let result = match existing {
            Some(q) => {
                let model = ActiveModel {
                    id: Set(q.id),
                    question_text: Set(question_text.to_string()),
                    updated_at: Set(now),
                    ..Default::default()
                };
                model.update(&self.db).await
            }
            None => {
                let model = ActiveModel {
                    evaluation_type: Set(evaluation_type.to_string()),
                    question_number: Set(question_number),
                    question_text: Set(question_text.to_string()),
                    is_active: Set(true),
                    updated_at: Set(now),
                    ..Default::default()
                };
                model.insert(&self.db).await
            }
        }
        .map_err(|e| EdulyticsError::database_operation(format!("保存评估题目失败: {e}")))?;

        Ok(result.into_question())
    }

    /// 更新题目文本或启用状态
    pub async fn update_question_impl(
        &self,
        id: i64,
        question_text: Option<String>,
        is_active: Option<bool>,
    ) -> Result<Option<EvaluationQuestion>> {
        if self.get_question_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(text) = question_text {
            model.question_text = Set(text);
        }

        if let Some(active) = is_active {
            model.is_active = Set(active);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("更新评估题目失败: {e}")))?;

        Ok(Some(result.into_question()))
    }

    /// 删除超出题号的题目
    pub async fn delete_questions_beyond_impl(
        &self,
        evaluation_type: EvaluationType,
        max_number: i32,
    ) -> Result<u64> {
        let result = EvaluationQuestions::delete_many()
            .filter(Column::EvaluationType.eq(evaluation_type.to_string()))
            .filter(Column::QuestionNumber.gt(max_number))
            .exec(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("删除评估题目失败: {e}")))?;

        Ok(result.rows_affected)
    }
}
