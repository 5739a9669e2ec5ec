use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ResultService;
use crate::middlewares::RequireJWT;
use crate::models::results::requests::{HistoryListParams, HistoryListQuery};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_history(
    service: &ResultService,
    request: &HttpRequest,
    query: HistoryListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(viewer) = RequireJWT::extract_user_claims(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user claims",
        )));
    };

    // 管理员不指定用户时查看全部
    let user_id = if viewer.role == UserRole::Admin {
        query.user_id
    } else {
        Some(viewer.id)
    };

    let list_query = HistoryListQuery {
        page: Some(query.pagination.page),
        size: Some(query.pagination.size),
        user_id,
        evaluation_type: query.evaluation_type,
        period_id: query.period_id,
    };

    match storage.list_history_with_pagination(list_query).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Evaluation history retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve evaluation history: {e}"),
            )),
        ),
    }
}

pub async fn get_history(
    service: &ResultService,
    request: &HttpRequest,
    id: i64,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(viewer) = RequireJWT::extract_user_claims(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::Unauthorized,
            "Unauthorized: missing user claims",
        )));
    };

    match storage.get_history_by_id(id).await {
        // 他人的历史记录按不存在处理
        Ok(Some(history)) if viewer.role == UserRole::Admin || history.user_id == viewer.id => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                history,
                "Evaluation history retrieved successfully",
            )))
        }
        Ok(_) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::NotFound,
            "Evaluation history not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve evaluation history: {e}"),
            )),
        ),
    }
}
