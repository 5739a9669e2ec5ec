use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{QuestionService, reject_without_questions};
use crate::middlewares::RequireJWT;
use crate::models::evaluations::requests::QuestionListParams;
use crate::models::evaluations::responses::QuestionListResponse;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};

pub async fn list_questions(
    service: &QuestionService,
    request: &HttpRequest,
    query: QuestionListParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Some(resp) = reject_without_questions(query.evaluation_type) {
        return Ok(resp);
    }

    // 管理员可以看到停用的题目
    let active_only = RequireJWT::extract_user_role(request) != Some(UserRole::Admin);

    match storage
        .list_questions(query.evaluation_type, active_only)
        .await
    {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            QuestionListResponse {
                evaluation_type: query.evaluation_type,
                items,
            },
            "Questions retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve questions: {e}"),
            )),
        ),
    }
}
