use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{UserService, create::check_profile};
use crate::middlewares::require_jwt::invalidate_user_cache;
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::entities::ActivityAction,
    users::{requests::UpdateUserRequest, responses::UserResponse},
};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};
use crate::utils::password::hash_password;
use crate::utils::validate::{validate_email, validate_password_simple};

pub async fn update_user(
    service: &UserService,
    user_id: i64,
    mut update_data: UpdateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let existing = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::UserNotFound,
                "User not found",
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to get user information: {e}"),
                )),
            );
        }
    };

    // 邮箱唯一
    if let Some(email) = update_data.email.take() {
        let email = email.trim().to_lowercase();
        if let Err(msg) = validate_email(&email) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
        }
        if let Ok(Some(other)) = storage.get_user_by_email(&email).await
            && other.id != user_id
        {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        update_data.email = Some(email);
    }

    // 角色或档案变化后按最终角色重新校验档案
    let role = update_data.role.clone().unwrap_or_else(|| existing.role.clone());
    let profile = update_data
        .profile
        .clone()
        .unwrap_or_else(|| existing.profile.clone());
    if (update_data.role.is_some() || update_data.profile.is_some())
        && let Err(response) = check_profile(&storage, &role, &profile).await
    {
        return Ok(response);
    }

    if let Some(password) = update_data.password.take() {
        if let Err(msg) = validate_password_simple(&password) {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
        }
        match hash_password(&password) {
            Ok(hash) => update_data.password = Some(hash),
            Err(e) => {
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Password hashing failed: {e}"),
                    )),
                );
            }
        }
    }

    match storage.update_user(user_id, update_data).await {
        Ok(Some(user)) => {
            invalidate_user_cache(&service.get_cache(request), user.id).await;
            log_admin_activity(
                &storage,
                request,
                ActivityAction::UpdateUser,
                format!("Updated account '{}'", user.username),
                ActivityTarget::user(user.id),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "User information updated successfully",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::UserNotFound,
            "User not found",
        ))),
        Err(e) => Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserUpdateFailed,
            format!("Failed to update user information: {e}"),
        ))),
    }
}
