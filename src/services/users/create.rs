use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::UserService;
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::entities::ActivityAction,
    users::{
        entities::{UserProfile, UserRole},
        requests::CreateUserRequest,
        responses::UserResponse,
    },
};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{
    validate_email, validate_password_simple, validate_profile, validate_username,
};

/// 校验档案并确认班级存在，失败时返回错误响应
pub(crate) async fn check_profile(
    storage: &Arc<dyn Storage>,
    role: &UserRole,
    profile: &UserProfile,
) -> Result<(), HttpResponse> {
    if let Err((field, msg)) = validate_profile(role, profile) {
        return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::UserProfileInvalid,
            format!("{field}: {msg}"),
        )));
    }

    if let Some(section_id) = profile.section_id {
        match storage.get_section_by_id(section_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::SectionNotFound,
                    "section: Section does not exist",
                )));
            }
            Err(e) => {
                return Err(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("Failed to check section: {e}"),
                    )),
                );
            }
        }
    }

    Ok(())
}

pub async fn create_user(
    service: &UserService,
    mut user_data: CreateUserRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 验证用户名
    if let Err(msg) = validate_username(&user_data.username) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserNameInvalid, msg)));
    }

    // 验证邮箱
    user_data.email = user_data.email.trim().to_lowercase();
    if let Err(msg) = validate_email(&user_data.email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }

    // 验证密码策略
    if let Err(msg) = validate_password_simple(&user_data.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    if let Err(response) = check_profile(&storage, &user_data.role, &user_data.profile).await {
        return Ok(response);
    }

    // 用户名与邮箱唯一
    match storage.get_user_by_username(&user_data.username).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserNameAlreadyExists,
                "Username already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(creation_failed(e)),
    }
    match storage.get_user_by_email(&user_data.email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(creation_failed(e)),
    }

    user_data.password = match hash_password(&user_data.password) {
        Ok(hash) => hash,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Password hashing failed: {e}"),
                )),
            );
        }
    };

    match storage.create_user(user_data).await {
        Ok(user) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::CreateUser,
                format!("Created {} account '{}'", user.role.label(), user.username),
                ActivityTarget::user(user.id),
            )
            .await;
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(UserResponse { user }, "User created successfully")))
        }
        Err(e) => Ok(creation_failed(e)),
    }
}

fn creation_failed(e: impl std::fmt::Display) -> HttpResponse {
    let msg = format!("User creation failed: {e}");
    error!("{}", msg);
    HttpResponse::InternalServerError()
        .json(ApiResponse::error_empty(ErrorCode::UserCreationFailed, msg))
}
