//! 评估周期与发布状态存储操作

use super::SeaOrmStorage;
use crate::entity::evaluation_periods::{ActiveModel, Column, Entity as EvaluationPeriods};
use crate::entity::evaluations::{
    ActiveModel as EvaluationActiveModel, Column as EvaluationColumn, Entity as Evaluations,
};
use crate::errors::{EdulyticsError, Result};
use crate::models::{
    PaginationInfo,
    evaluations::{
        entities::{Evaluation, EvaluationPeriod, EvaluationType},
        responses::PeriodListResponse,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建评估周期
    pub async fn create_period_impl(
        &self,
        name: &str,
        evaluation_type: EvaluationType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        is_active: bool,
    ) -> Result<EvaluationPeriod> {
        let model = ActiveModel {
            name: Set(name.to_string()),
            evaluation_type: Set(evaluation_type.to_string()),
            start_date: Set(start.timestamp()),
            end_date: Set(end.timestamp()),
            is_active: Set(is_active),
            created_at: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("创建评估周期失败: {e}")))?;

        Ok(result.into_period())
    }

    /// 通过 ID 获取周期
    pub async fn get_period_by_id_impl(&self, id: i64) -> Result<Option<EvaluationPeriod>> {
        let result = EvaluationPeriods::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估周期失败: {e}")))?;

        Ok(result.map(|m| m.into_period()))
    }

    /// 按名称查找周期
    pub async fn find_period_by_name_impl(
        &self,
        evaluation_type: EvaluationType,
        name: &str,
    ) -> Result<Option<EvaluationPeriod>> {
        let result = EvaluationPeriods::find()
            .filter(Column::EvaluationType.eq(evaluation_type.to_string()))
            .filter(Column::Name.eq(name))
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估周期失败: {e}")))?;

        Ok(result.map(|m| m.into_period()))
    }

    /// 当前进行中的周期
    pub async fn get_active_period_impl(
        &self,
        evaluation_type: EvaluationType,
    ) -> Result<Option<EvaluationPeriod>> {
        let result = EvaluationPeriods::find()
            .filter(Column::EvaluationType.eq(evaluation_type.to_string()))
            .filter(Column::IsActive.eq(true))
            .order_by_desc(Column::StartDate)
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估周期失败: {e}")))?;

        Ok(result.map(|m| m.into_period()))
    }

    /// 最近结束的周期
    pub async fn get_latest_inactive_period_impl(
        &self,
        evaluation_type: EvaluationType,
    ) -> Result<Option<EvaluationPeriod>> {
        let result = EvaluationPeriods::find()
            .filter(Column::EvaluationType.eq(evaluation_type.to_string()))
            .filter(Column::IsActive.eq(false))
            .order_by_desc(Column::EndDate)
            .order_by_desc(Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估周期失败: {e}")))?;

        Ok(result.map(|m| m.into_period()))
    }

    /// 列出某类型的周期
    pub async fn list_periods_impl(
        &self,
        evaluation_type: EvaluationType,
        is_active: Option<bool>,
    ) -> Result<Vec<EvaluationPeriod>> {
        let mut select =
            EvaluationPeriods::find().filter(Column::EvaluationType.eq(evaluation_type.to_string()));

        if let Some(active) = is_active {
            select = select.filter(Column::IsActive.eq(active));
        }

        let periods = select
            .order_by_desc(Column::StartDate)
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询评估周期失败: {e}")))?;

        Ok(periods.into_iter().map(|m| m.into_period()).collect())
    }

    /// 分页列出周期
    pub async fn list_periods_with_pagination_impl(
        &self,
        evaluation_type: Option<EvaluationType>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<PeriodListResponse> {
        let page = page.unwrap_or(1).max(1) as u64;
        let size = size.unwrap_or(10).clamp(1, 100) as u64;

        let mut select = EvaluationPeriods::find();
        if let Some(t) = evaluation_type {
            select = select.filter(Column::EvaluationType.eq(t.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::StartDate)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询周期总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询周期页数失败: {e}")))?;

        let periods = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询周期列表失败: {e}")))?;

        Ok(PeriodListResponse {
            items: periods.into_iter().map(|m| m.into_period()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 重新激活周期
    pub async fn activate_period_impl(
        &self,
        id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<EvaluationPeriod>> {
        if self.get_period_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let model = ActiveModel {
            id: Set(id),
            start_date: Set(start.timestamp()),
            end_date: Set(end.timestamp()),
            is_active: Set(true),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("激活评估周期失败: {e}")))?;

        Ok(Some(result.into_period()))
    }

    /// 关闭所有进行中的周期
    pub async fn deactivate_active_periods_impl(
        &self,
        evaluation_type: EvaluationType,
        end: DateTime<Utc>,
    ) -> Result<Vec<EvaluationPeriod>> {
        let active = self.list_periods_impl(evaluation_type, Some(true)).await?;
        if active.is_empty() {
            return Ok(active);
        }

        let ids: Vec<i64> = active.iter().map(|p| p.id).collect();

        EvaluationPeriods::update_many()
            .col_expr(Column::IsActive, sea_orm::sea_query::Expr::value(false))
            .col_expr(Column::EndDate, sea_orm::sea_query::Expr::value(end.timestamp()))
            .filter(Column::Id.is_in(ids))
            .exec(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("关闭评估周期失败: {e}")))?;

        Ok(active
            .into_iter()
            .map(|mut p| {
                p.is_active = false;
                p.end_date = end;
                p
            })
            .collect())
    }

    /// 获取发布状态
    pub async fn get_evaluation_state_impl(
        &self,
        evaluation_type: EvaluationType,
    ) -> Result<Option<Evaluation>> {
        let result = Evaluations::find()
            .filter(EvaluationColumn::EvaluationType.eq(evaluation_type.to_string()))
            .one(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询发布状态失败: {e}")))?;

        Ok(result.map(|m| m.into_evaluation()))
    }

    /// 设置发布状态
    pub async fn set_evaluation_release_impl(
        &self,
        evaluation_type: EvaluationType,
        is_released: bool,
        period_id: Option<i64>,
    ) -> Result<Evaluation> {
        let now = Utc::now().timestamp();

        let result = match self.get_evaluation_state_impl(evaluation_type).await? {
            Some(existing) => {
                let model = EvaluationActiveModel {
                    id: Set(existing.id),
                    is_released: Set(is_released),
                    evaluation_period_id: Set(period_id),
                    updated_at: Set(now),
                    ..Default::default()
                };
                model.update(&self.db).await
            }
            None => {
                let model = EvaluationActiveModel {
                    evaluation_type: Set(evaluation_type.to_string()),
                    is_released: Set(is_released),
                    evaluation_period_id: Set(period_id),
                    updated_at: Set(now),
                    ..Default::default()
                };
                model.insert(&self.db).await
            }
        }
        .map_err(|e| EdulyticsError::database_operation(format!("更新发布状态失败: {e}")))?;

        Ok(result.into_evaluation())
    }
}
