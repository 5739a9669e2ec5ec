//! 评估结果与历史存储操作

use super::SeaOrmStorage;
use crate::entity::evaluation_history::{
    ActiveModel as HistoryActiveModel, Column as HistoryColumn, Entity as EvaluationHistoryEntity,
};
use crate::entity::evaluation_results::{ActiveModel, Column, Entity as EvaluationResults};
use crate::errors::{EdulyticsError, Result};
use crate::models::{
    PaginationInfo,
    evaluations::entities::EvaluationPeriod,
    results::{
        entities::{EvaluationHistory, EvaluationResult, ResultUpsert},
        requests::HistoryListQuery,
        responses::HistoryListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

impl SeaOrmStorage {
    /// 写入或更新结果，按 (用户, 周期, 班级) 唯一
    pub async fn upsert_result_impl(&self, result: ResultUpsert) -> Result<EvaluationResult> {
        let now = chrono::Utc::now().timestamp();

        let mut select = EvaluationResults::find()
            .filter(Column::UserId.eq(result.user_id))
            .filter(Column::EvaluationPeriodId.eq(result.evaluation_period_id));

        // NULL 不能用等号比较
        select = match result.section_id {
            Some(section_id) => select.filter(Column::SectionId.eq(section_id)),
            None => select.filter(Column::SectionId.is_null()),
        };

        let existing = select
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估结果失败: {e}")))?;

        let mut model = ActiveModel {
            user_id: Set(result.user_id),
            evaluation_period_id: Set(result.evaluation_period_id),
            section_id: Set(result.section_id),
            category_a_score: Set(result.scores.category_a),
            category_b_score: Set(result.scores.category_b),
            category_c_score: Set(result.scores.category_c),
            category_d_score: Set(result.scores.category_d),
            total_percentage: Set(result.scores.total),
            average_rating: Set(result.average_rating),
            total_responses: Set(result.total_responses),
            poor_count: Set(result.distribution.poor),
            unsatisfactory_count: Set(result.distribution.unsatisfactory),
            satisfactory_count: Set(result.distribution.satisfactory),
            very_satisfactory_count: Set(result.distribution.very_satisfactory),
            outstanding_count: Set(result.distribution.outstanding),
            calculated_at: Set(now),
            ..Default::default()
        };

        let saved = match existing {
            Some(row) => {
                model.id = Set(row.id);
                model.update(&self.db).await
            }
            None => model.insert(&self.db).await,
        }
        .map_err(|e| EdulyticsError::database_operation(format!("保存评估结果失败: {e}")))?;

        Ok(saved.into_result())
    }

    /// 周期内全部结果
    pub async fn list_results_by_period_impl(
        &self,
        period_id: i64,
    ) -> Result<Vec<EvaluationResult>> {
        let results = EvaluationResults::find()
            .filter(Column::EvaluationPeriodId.eq(period_id))
            .order_by_asc(Column::UserId)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估结果失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_result()).collect())
    }

    /// 用户的结果
    pub async fn list_results_for_user_impl(
        &self,
        user_id: i64,
        period_id: Option<i64>,
    ) -> Result<Vec<EvaluationResult>> {
        let mut select = EvaluationResults::find().filter(Column::UserId.eq(user_id));

        if let Some(period_id) = period_id {
            select = select.filter(Column::EvaluationPeriodId.eq(period_id));
        }

        let results = select
            .order_by_desc(Column::CalculatedAt)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估结果失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_result()).collect())
    }

    /// 用户最近一次的整体结果（不分班级）
    pub async fn get_latest_result_for_user_impl(
        &self,
        user_id: i64,
    ) -> Result<Option<EvaluationResult>> {
        let result = EvaluationResults::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::SectionId.is_null())
            .order_by_desc(Column::CalculatedAt)
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估结果失败: {e}")))?;

        Ok(result.map(|m| m.into_result()))
    }

    /// 归档周期结果，重复归档时覆盖旧快照
    pub async fn archive_period_results_impl(&self, period: &EvaluationPeriod) -> Result<usize> {
        let results = self.list_results_by_period_impl(period.id).await?;
        if results.is_empty() {
            return Ok(0);
        }

        let now = chrono::Utc::now().timestamp();
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("开启事务失败: {e}")))?;

        EvaluationHistoryEntity::delete_many()
            .filter(HistoryColumn::EvaluationPeriodId.eq(period.id))
            .exec(&txn)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("清理历史快照失败: {e}")))?;

        let count = results.len();
        let models = results.into_iter().map(|r| HistoryActiveModel {
            user_id: Set(r.user_id),
            evaluation_period_id: Set(period.id),
            section_id: Set(r.section_id),
            evaluation_type: Set(period.evaluation_type.to_string()),
            period_name: Set(period.name.clone()),
            period_start: Set(period.start_date.timestamp()),
            period_end: Set(period.end_date.timestamp()),
            category_a_score: Set(r.scores.category_a),
            category_b_score: Set(r.scores.category_b),
            category_c_score: Set(r.scores.category_c),
            category_d_score: Set(r.scores.category_d),
            total_percentage: Set(r.total_percentage),
            average_rating: Set(r.average_rating),
            total_responses: Set(r.total_responses),
            poor_count: Set(r.distribution.poor),
            unsatisfactory_count: Set(r.distribution.unsatisfactory),
            satisfactory_count: Set(r.distribution.satisfactory),
            very_satisfactory_count: Set(r.distribution.very_satisfactory),
            outstanding_count: Set(r.distribution.outstanding),
            archived_at: Set(now),
            ..Default::default()
        });

        EvaluationHistoryEntity::insert_many(models)
            .exec(&txn)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("写入历史快照失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(count)
    }

    /// 周期是否已归档
    pub async fn has_history_for_period_impl(&self, period_id: i64) -> Result<bool> {
        let count = EvaluationHistoryEntity::find()
            .filter(HistoryColumn::EvaluationPeriodId.eq(period_id))
            .count(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询历史快照失败: {e}")))?;

        Ok(count > 0)
    }

    /// 分页列出历史
    pub async fn list_history_with_pagination_impl(
        &self,
        query: HistoryListQuery,
    ) -> Result<HistoryListResponse> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = EvaluationHistoryEntity::find();

        if let Some(user_id) = query.user_id {
            select = select.filter(HistoryColumn::UserId.eq(user_id));
        }

        if let Some(evaluation_type) = query.evaluation_type {
            select = select.filter(HistoryColumn::EvaluationType.eq(evaluation_type.to_string()));
        }

        if let Some(period_id) = query.period_id {
            select = select.filter(HistoryColumn::EvaluationPeriodId.eq(period_id));
        }

        let paginator = select
            .order_by_desc(HistoryColumn::PeriodEnd)
            .order_by_desc(HistoryColumn::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询历史总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询历史页数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询历史列表失败: {e}")))?;

        Ok(HistoryListResponse {
            items: items.into_iter().map(|m| m.into_history()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 通过 ID 获取历史
    pub async fn get_history_by_id_impl(&self, id: i64) -> Result<Option<EvaluationHistory>> {
        let result = EvaluationHistoryEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询历史快照失败: {e}")))?;

        Ok(result.map(|m| m.into_history()))
    }
}
