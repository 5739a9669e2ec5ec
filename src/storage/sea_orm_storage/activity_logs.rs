//! 管理员操作日志存储操作

use super::SeaOrmStorage;
use crate::entity::admin_activity_logs::{ActiveModel, Column, Entity as AdminActivityLogs};
use crate::errors::{EdulyticsError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    activity_logs::{
        entities::{ActivityAction, AdminActivityLog, NewActivityLog},
        requests::ActivityLogListQuery,
        responses::ActionCount,
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 写入操作日志
    pub async fn create_activity_log_impl(&self, log: NewActivityLog) -> Result<AdminActivityLog> {
        let model = ActiveModel {
            admin_id: Set(log.admin_id),
            action: Set(log.action.to_string()),
            target_user_id: Set(log.target_user_id),
            target_section_id: Set(log.target_section_id),
            description: Set(log.description),
            ip_address: Set(log.ip_address),
            timestamp: Set(Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("写入操作日志失败: {e}")))?;

        Ok(result.into_activity_log())
    }

    /// 分页列出操作日志
    pub async fn list_activity_logs_with_pagination_impl(
        &self,
        query: ActivityLogListQuery,
    ) -> Result<PaginatedResponse<AdminActivityLog>> {
        let page = query.page.unwrap_or(1).max(1) as u64;
        let size = query.size.unwrap_or(50).clamp(1, 100) as u64;

        let mut select = AdminActivityLogs::find();

        if let Some(action) = query.action {
            select = select.filter(Column::Action.eq(action.to_string()));
        }

        let paginator = select
            .order_by_desc(Column::Timestamp)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);

        let total = paginator
            .num_items()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询日志总数失败: {e}")))?;

        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询日志页数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("查询日志列表失败: {e}")))?;

        Ok(PaginatedResponse {
            items: items.into_iter().map(|m| m.into_activity_log()).collect(),
            pagination: PaginationInfo {
                page: page as i64,
                page_size: size as i64,
                total: total as i64,
                total_pages: pages as i64,
            },
        })
    }

    /// 按操作类型统计
    pub async fn count_activity_logs_by_action_impl(&self) -> Result<Vec<ActionCount>> {
        let rows: Vec<(String, i64)> = AdminActivityLogs::find()
            .select_only()
            .column(Column::Action)
            .column_as(Column::Id.count(), "count")
            .group_by(Column::Action)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("统计操作日志失败: {e}")))?;

        let mut counts: Vec<ActionCount> = rows
            .into_iter()
            .filter_map(|(action, count)| {
                action
                    .parse::<ActivityAction>()
                    .ok()
                    .map(|action| ActionCount { action, count })
            })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(counts)
    }

    /// 删除早于截止时间的日志
    pub async fn delete_activity_logs_before_impl(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = AdminActivityLogs::delete_many()
            .filter(Column::Timestamp.lt(cutoff.timestamp()))
            .exec(&self.db)
            .await
            .map_err(|e| EdulyticsError::database_operation(format!("清理操作日志失败: {e}")))?;

        Ok(result.rows_affected)
    }
}
