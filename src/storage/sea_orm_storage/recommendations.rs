//! AI 建议存储操作

use super::SeaOrmStorage;
use crate::entity::ai_recommendations::{ActiveModel, Column, Entity as AiRecommendations};
use crate::errors::{EdulyticsError, Result};
use crate::models::evaluations::entities::EvaluationType;
use crate::models::recommendations::entities::{Recommendation, StoredRecommendation};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 替换用户在该周期的建议
    pub async fn replace_recommendations_impl(
        &self,
        user_id: i64,
        period_id: i64,
        evaluation_type: EvaluationType,
        section_code: Option<String>,
        recommendations: &[Recommendation],
    ) -> Result<Vec<StoredRecommendation>> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("开启事务失败: {e}")))?;

        AiRecommendations::delete_many()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::EvaluationPeriodId.eq(period_id))
            .exec(&txn)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("删除旧建议失败: {e}")))?;

        let mut stored = Vec::with_capacity(recommendations.len());
        for rec in recommendations {
            let model = ActiveModel {
                user_id: Set(user_id),
                evaluation_period_id: Set(period_id),
                title: Set(rec.title.clone()),
                description: Set(rec.description.clone()),
                priority: Set(rec.priority.to_string()),
                reason: Set(rec.reason.clone()),
                evaluation_type: Set(evaluation_type.to_string()),
                section_code: Set(section_code.clone()),
                created_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("保存建议失败: {e}")))?;

            stored.push(model.into_recommendation());
        }

        txn.commit()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(stored)
    }

    /// 列出已保存的建议
    pub async fn list_recommendations_impl(
        &self,
        user_id: i64,
        period_id: Option<i64>,
    ) -> Result<Vec<StoredRecommendation>> {
        let mut select = AiRecommendations::find().filter(Column::UserId.eq(user_id));

        if let Some(period_id) = period_id {
            select = select.filter(Column::EvaluationPeriodId.eq(period_id));
        }

        let items = select
            .order_by_desc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询建议失败: {e}")))?;

        Ok(items.into_iter().map(|m| m.into_recommendation()).collect())
    }
}
