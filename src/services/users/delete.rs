use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::middlewares::{RequireJWT, require_jwt::invalidate_user_cache};
use crate::models::{ApiResponse, ErrorCode, activity_logs::entities::ActivityAction};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};

pub async fn delete_user(
    service: &UserService,
    user_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 禁止删除当前用户
    if RequireJWT::extract_user_id(request) == Some(user_id) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::CanNotDeleteCurrentUser,
            "Cannot delete current user",
        )));
    }

    let username = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user.username,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::UserDeleteFailed,
                    format!("User deletion failed: {e}"),
                )),
            );
        }
    };

    // AI 建议与操作日志中的引用由外键级联处理
    match storage.delete_user(user_id).await {
        Ok(true) => {
            invalidate_user_cache(&service.get_cache(request), user_id).await;
            log_admin_activity(
                &storage,
                request,
                ActivityAction::DeleteUser,
                format!("Deleted account '{username}'"),
                Default::default(),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("User deleted successfully")))
        }
        Ok(false) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::UserDeleteFailed,
                format!("User deletion failed: {e}"),
            )),
        ),
    }
}
