use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{ActivityLogService, cleanup};
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::{
        requests::{ActivityLogListParams, ActivityLogListQuery},
        responses::ActivityLogListResponse,
    },
};
use crate::services::system::DynamicConfig;

pub async fn list_activity_logs(
    service: &ActivityLogService,
    query: ActivityLogListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let list_query = ActivityLogListQuery {
        page: query.page,
        size: query.size,
        action: query.action,
    };

    let page = match storage.list_activity_logs_with_pagination(list_query).await {
        Ok(page) => page,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("获取操作日志失败: {e}"),
                )),
            );
        }
    };

    let action_stats = match storage.count_activity_logs_by_action().await {
        Ok(stats) => stats,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("统计操作日志失败: {e}"),
                )),
            );
        }
    };

    let response = ActivityLogListResponse {
        items: page.items,
        pagination: page.pagination,
        action_stats,
        retention_days: DynamicConfig::activity_log_retention_days().await,
        next_cleanup: cleanup::next_cleanup_at(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Activity logs retrieved successfully",
    )))
}
