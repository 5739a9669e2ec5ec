//! 评估未通过跟踪存储操作

use super::SeaOrmStorage;
use crate::entity::evaluation_failure_logs::{
    ActiveModel as FailureLogActiveModel, Column as FailureLogColumn,
    Entity as EvaluationFailureLogs,
};
use crate::entity::users::{ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users};
use crate::errors::{EdulyticsError, Result};
use crate::models::results::entities::FailureLog;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 记录一次未通过
    pub async fn record_evaluation_failure_impl(
        &self,
        user_id: i64,
        period_id: Option<i64>,
        score: f64,
        passing_score: f64,
    ) -> Result<i32> {
        let now = chrono::Utc::now().timestamp();

        let user = Users::find_by_id(user_id)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询用户失败: {e}")))?
            .ok_or_else(|| EdulyticsError::not_found(format!("用户 {user_id} 不存在")))?;

        let count = user.evaluation_failure_count + 1;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("开启事务失败: {e}")))?;

        FailureLogActiveModel {
            user_id: Set(user_id),
            evaluation_period_id: Set(period_id),
            score: Set(score),
            passing_score: Set(passing_score),
            evaluation_date: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| EdulyticsError::database_operation(format!("写入未通过记录失败: {e}")))?;

        UserActiveModel {
            id: Set(user_id),
            evaluation_failure_count: Set(count),
            last_evaluation_failure_date: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        }
        .update(&txn)
        .await
        .map_err(|e| EdulyticsError::database_operation(format!("更新未通过次数失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(count)
    }

    /// 标记已发送警报
    pub async fn mark_failure_alert_sent_impl(&self, user_id: i64) -> Result<bool> {
        let result = Users::update_many()
            .col_expr(UserColumn::FailureAlertSent, Expr::value(true))
            .filter(UserColumn::Id.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("更新警报状态失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 清零未通过次数
    pub async fn reset_evaluation_failures_impl(&self, user_ids: Option<Vec<i64>>) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();

        let mut update = Users::update_many()
            .col_expr(UserColumn::EvaluationFailureCount, Expr::value(0))
            .col_expr(UserColumn::FailureAlertSent, Expr::value(false))
            .col_expr(
                UserColumn::LastEvaluationFailureDate,
                Expr::value(Option::<i64>::None),
            )
            .col_expr(UserColumn::UpdatedAt, Expr::value(now));

        match user_ids {
            Some(ref ids) if ids.is_empty() => return Ok(0),
            Some(ref ids) => {
                update = update.filter(UserColumn::Id.is_in(ids.clone()));
            }
            None => {
                update = update.filter(UserColumn::EvaluationFailureCount.gt(0));
            }
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("开启事务失败: {e}")))?;

        let result = update
            .exec(&txn)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("重置未通过次数失败: {e}")))?;

        // 全部重置时同时清空记录
        if user_ids.is_none() {
            EvaluationFailureLogs::delete_many()
                .exec(&txn)
                .await
                .map_err(|e| {
                    EdulyticsError::database_operation(format!("清空未通过记录失败: {e}"))
                })?;
        }

        txn.commit()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected)
    }

    /// 最近的未通过记录
    pub async fn list_failure_logs_impl(&self, user_id: i64, limit: u64) -> Result<Vec<FailureLog>> {
        let logs = EvaluationFailureLogs::find()
            .filter(FailureLogColumn::UserId.eq(user_id))
            .order_by_desc(FailureLogColumn::EvaluationDate)
            .order_by_desc(FailureLogColumn::Id)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询未通过记录失败: {e}")))?;

        Ok(logs.into_iter().map(|m| m.into_failure_log()).collect())
    }
}
