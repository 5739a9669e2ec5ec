//! 评估答卷存储操作

use super::SeaOrmStorage;
use crate::entity::evaluation_responses::{
    ActiveModel, Column, Entity as EvaluationResponses,
};
use crate::entity::irregular_evaluations::{
    ActiveModel as IrregularActiveModel, Column as IrregularColumn,
    Entity as IrregularEvaluations,
};
use crate::errors::{EdulyticsError, Result};
use crate::models::evaluations::entities::{
    EvaluationResponse, IrregularEvaluation, NewEvaluationResponse,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 保存答卷
    pub async fn create_response_impl(
        &self,
        response: NewEvaluationResponse,
    ) -> Result<EvaluationResponse> {
        let ratings = serde_json::to_string(&response.ratings)?;

        let model = ActiveModel {
            evaluator_id: Set(response.evaluator_id),
            evaluatee_id: Set(response.evaluatee_id),
            evaluation_period_id: Set(response.evaluation_period_id),
            evaluation_type: Set(response.evaluation_type.to_string()),
            student_number: Set(response.student_number),
            student_section: Set(response.student_section),
            comments: Set(response.comments),
            ratings: Set(ratings),
            submitted_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("保存答卷失败: {e}")))?;

        Ok(result.into_response())
    }

    /// 保存非正常班学生答卷
    pub async fn create_irregular_evaluation_impl(
        &self,
        response: NewEvaluationResponse,
    ) -> Result<IrregularEvaluation> {
        let ratings = serde_json::to_string(&response.ratings)?;

        let model = IrregularActiveModel {
            evaluator_id: Set(response.evaluator_id),
            evaluatee_id: Set(response.evaluatee_id),
            evaluation_period_id: Set(response.evaluation_period_id),
            student_number: Set(response.student_number),
            comments: Set(response.comments),
            ratings: Set(ratings),
            submitted_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("保存答卷失败: {e}")))?;

        Ok(result.into_irregular())
    }

    /// 检查是否已评估
    pub async fn response_exists_impl(
        &self,
        evaluator_id: i64,
        evaluatee_id: i64,
        period_id: i64,
    ) -> Result<bool> {
        let regular = EvaluationResponses::find()
            .filter(Column::EvaluatorId.eq(evaluator_id))
            .filter(Column::EvaluateeId.eq(evaluatee_id))
            .filter(Column::EvaluationPeriodId.eq(period_id))
            .count(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询答卷失败: {e}")))?;

        if regular > 0 {
            return Ok(true);
        }

        let irregular = IrregularEvaluations::find()
            .filter(IrregularColumn::EvaluatorId.eq(evaluator_id))
            .filter(IrregularColumn::EvaluateeId.eq(evaluatee_id))
            .filter(IrregularColumn::EvaluationPeriodId.eq(period_id))
            .count(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询答卷失败: {e}")))?;

        Ok(irregular > 0)
    }

    /// 列出被评估者收到的答卷
    pub async fn list_responses_for_evaluatee_impl(
        &self,
        evaluatee_id: i64,
        period_id: Option<i64>,
        section: Option<&str>,
    ) -> Result<Vec<EvaluationResponse>> {
        let mut select = EvaluationResponses::find().filter(Column::EvaluateeId.eq(evaluatee_id));

        if let Some(period_id) = period_id {
            select = select.filter(Column::EvaluationPeriodId.eq(period_id));
        }

        if let Some(section) = section {
            select = select.filter(Column::StudentSection.eq(section));
        }

        let responses = select
            .order_by_asc(Column::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询答卷失败: {e}")))?;

        Ok(responses.into_iter().map(|m| m.into_response()).collect())
    }

    /// 列出被评估者收到的非正常班答卷
    pub async fn list_irregular_for_evaluatee_impl(
        &self,
        evaluatee_id: i64,
        period_id: Option<i64>,
    ) -> Result<Vec<IrregularEvaluation>> {
        let mut select =
            IrregularEvaluations::find().filter(IrregularColumn::EvaluateeId.eq(evaluatee_id));

        if let Some(period_id) = period_id {
            select = select.filter(IrregularColumn::EvaluationPeriodId.eq(period_id));
        }

        let responses = select
            .order_by_asc(IrregularColumn::SubmittedAt)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询答卷失败: {e}")))?;

        Ok(responses.into_iter().map(|m| m.into_irregular()).collect())
    }

    /// 评估者在周期内已评估的对象
    pub async fn list_evaluated_ids_impl(
        &self,
        evaluator_id: i64,
        period_id: i64,
    ) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = EvaluationResponses::find()
            .select_only()
            .column(Column::EvaluateeId)
            .filter(Column::EvaluatorId.eq(evaluator_id))
            .filter(Column::EvaluationPeriodId.eq(period_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询答卷失败: {e}")))?;

        let irregular: Vec<i64> = IrregularEvaluations::find()
            .select_only()
            .column(IrregularColumn::EvaluateeId)
            .filter(IrregularColumn::EvaluatorId.eq(evaluator_id))
            .filter(IrregularColumn::EvaluationPeriodId.eq(period_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询答卷失败: {e}")))?;

        ids.extend(irregular);
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }

    /// 周期内收到过答卷的对象
    pub async fn list_evaluatee_ids_with_responses_impl(&self, period_id: i64) -> Result<Vec<i64>> {
        let mut ids: Vec<i64> = EvaluationResponses::find()
            .select_only()
            .column(Column::EvaluateeId)
            .distinct()
            .filter(Column::EvaluationPeriodId.eq(period_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询答卷失败: {e}")))?;

        let irregular: Vec<i64> = IrregularEvaluations::find()
            .select_only()
            .column(IrregularColumn::EvaluateeId)
            .distinct()
            .filter(IrregularColumn::EvaluationPeriodId.eq(period_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询答卷失败: {e}")))?;

        ids.extend(irregular);
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
