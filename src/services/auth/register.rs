use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::requests::RegisterRequest,
    users::{
        entities::{UserProfile, UserRole},
        requests::CreateUserRequest,
        responses::UserResponse,
    },
};
use crate::storage::Storage;
use crate::utils::password::hash_password;
use crate::utils::validate::{
    normalize_student_number, username_base_from_email, validate_email, validate_email_domain,
    validate_password_confirmation, validate_password_simple, validate_profile,
};

use super::AuthService;

// 用户名后缀尝试上限
const MAX_USERNAME_ATTEMPTS: u32 = 1000;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 管理员账号只能由管理员创建
    if register_request.role == UserRole::Admin {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::error_empty(
            ErrorCode::RegisterFailed,
            "Admin accounts cannot be self-registered",
        )));
    }

    // 1. 邮箱格式与域名
    let email = register_request.email.trim().to_lowercase();
    if let Err(msg) = validate_email(&email) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserEmailInvalid, msg)));
    }
    if let Err(msg) = validate_email_domain(&email, &register_request.role) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::EmailDomainNotAllowed, msg)));
    }

    // 2. 密码策略
    if let Err(msg) = validate_password_simple(&register_request.password) {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }
    if let Err(msg) =
        validate_password_confirmation(&register_request.password, &register_request.confirm_password)
    {
        return Ok(HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::UserPasswordInvalid, msg)));
    }

    // 3. 档案
    let profile = match build_profile(&register_request) {
        Ok(profile) => profile,
        Err((field, msg)) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::UserProfileInvalid,
                format!("{field}: {msg}"),
            )));
        }
    };

    if let Some(section_id) = profile.section_id {
        match storage.get_section_by_id(section_id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::SectionNotFound,
                    "section: Selected section does not exist",
                )));
            }
            Err(e) => return Ok(register_failed(e)),
        }
    }

    // 4. 邮箱唯一
    match storage.get_user_by_email(&email).await {
        Ok(Some(_)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::UserEmailAlreadyExists,
                "Email already exists",
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(register_failed(e)),
    }

    // 5. 由邮箱生成用户名
    let username = match generate_unique_username(&storage, &email).await {
        Ok(username) => username,
        Err(e) => return Ok(register_failed(e)),
    };

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(register_failed(e)),
    };

    let create_request = CreateUserRequest {
        username,
        email,
        password: password_hash,
        role: register_request.role,
        profile,
    };

    match storage.create_user(create_request).await {
        Ok(user) => {
            tracing::info!("User {} registered as {}", user.username, user.role);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                UserResponse { user },
                "Registration successful",
            )))
        }
        Err(e) => Ok(register_failed(e)),
    }
}

fn register_failed(e: impl std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
        ErrorCode::RegisterFailed,
        format!("Register failed: {e}"),
    ))
}

/// 按角色组装档案并校验
fn build_profile(
    register_request: &RegisterRequest,
) -> std::result::Result<UserProfile, (&'static str, &'static str)> {
    let is_student = register_request.role == UserRole::Student;

    let student_number = match register_request.student_number.as_deref() {
        Some(number) if is_student && !number.trim().is_empty() => {
            Some(normalize_student_number(number).map_err(|e| ("student_number", e))?)
        }
        _ => None,
    };

    let profile = UserProfile {
        display_name: register_request.display_name.trim().to_string(),
        student_number,
        course: is_student
            .then(|| register_request.course.clone())
            .flatten(),
        section_id: is_student.then_some(register_request.section_id).flatten(),
        institute: (!is_student)
            .then(|| register_request.institute.clone())
            .flatten(),
        is_irregular: false,
    };

    validate_profile(&register_request.role, &profile)?;
    Ok(profile)
}

/// 邮箱本地部分加数字后缀，直到用户名未被占用
pub(crate) async fn generate_unique_username(
    storage: &Arc<dyn Storage>,
    email: &str,
) -> Result<String> {
    let base = username_base_from_email(email);
    if storage.get_user_by_username(&base).await?.is_none() {
        return Ok(base);
    }
    for suffix in 1..MAX_USERNAME_ATTEMPTS {
        let candidate = format!("{base}{suffix}");
        if storage.get_user_by_username(&candidate).await?.is_none() {
            return Ok(candidate);
        }
    }
    Err(crate::errors::EdulyticsError::conflict(format!(
        "Unable to generate a unique username for {email}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    fn student_request() -> RegisterRequest {
        RegisterRequest {
            email: "juan.delacruz@cca.edu.ph".to_string(),
            password: "Str0ng!Pass".to_string(),
            confirm_password: "Str0ng!Pass".to_string(),
            display_name: "Juan Dela Cruz".to_string(),
            role: UserRole::Student,
            student_number: Some("210123".to_string()),
            course: Some("BSIT".to_string()),
            section_id: Some(1),
            institute: Some("ignored".to_string()),
        }
    }

    #[test]
    fn test_build_profile_normalizes_student_number() {
        let profile = build_profile(&student_request()).unwrap();
        assert_eq!(profile.student_number.as_deref(), Some("21-0123"));
        assert_eq!(profile.institute, None);
    }

    #[test]
    fn test_build_profile_requires_institute_for_staff() {
        let mut req = student_request();
        req.role = UserRole::Faculty;
        req.institute = None;
        let err = build_profile(&req).unwrap_err();
        assert_eq!(err.0, "institute");
    }

    #[test]
    fn test_build_profile_rejects_short_student_number() {
        let mut req = student_request();
        req.student_number = Some("21-012".to_string());
        assert_eq!(build_profile(&req).unwrap_err().0, "student_number");
    }

    #[tokio::test]
    async fn test_generate_unique_username_appends_suffix() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        assert_eq!(
            generate_unique_username(&storage, "juan.dc@cca.edu.ph").await.unwrap(),
            "juandc"
        );

        storage
            .create_user(CreateUserRequest {
                username: "juandc".to_string(),
                email: "juandc@cca.edu.ph".to_string(),
                password: "hash".to_string(),
                role: UserRole::Admin,
                profile: UserProfile {
                    display_name: "Juan".to_string(),
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(
            generate_unique_username(&storage, "juan.dc@gmail.com").await.unwrap(),
            "juandc1"
        );
    }
}
