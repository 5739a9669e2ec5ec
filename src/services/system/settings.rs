use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{DynamicConfig, SystemService, started_at};
use crate::middlewares::RequireJWT;
use crate::models::activity_logs::entities::ActivityAction;
use crate::models::{
    ApiResponse, ErrorCode,
    system::{
        entities::KnownSettingKey,
        requests::{BatchUpdateSettingsRequest, SettingAuditQuery, UpdateSettingRequest},
        responses::{AdminSettingsListResponse, SettingResponse, SystemSettingsResponse},
    },
};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};
use crate::utils::client_ip;
use crate::utils::validate::validate_email;

/// 校验键和值，返回规范化后的值
pub fn validate_setting(key: &str, value: &str) -> Result<String, String> {
    let known: KnownSettingKey = key.parse()?;
    known.value_type().validate(value)?;

    let value = value.trim().to_string();
    match known {
        KnownSettingKey::PassingScore => {
            let score: f64 = value.parse().map_err(|_| "Invalid passing score".to_string())?;
            if !(0.0..=100.0).contains(&score) {
                return Err("Passing score must be between 0 and 100".to_string());
            }
        }
        KnownSettingKey::MaxFailureAttempts
        | KnownSettingKey::PeriodDays
        | KnownSettingKey::ActivityLogRetentionDays
        | KnownSettingKey::AccessTokenExpiry
        | KnownSettingKey::RefreshTokenExpiry => {
            let n: i64 = value.parse().map_err(|_| "Invalid integer".to_string())?;
            if n < 1 {
                return Err(format!("{key} must be at least 1"));
            }
        }
        KnownSettingKey::SchoolHeadEmail => {
            let email = value.to_ascii_lowercase();
            if !email.is_empty() && validate_email(&email).is_err() {
                return Err("School head e-mail is not a valid address".to_string());
            }
            return Ok(email);
        }
        KnownSettingKey::SystemName | KnownSettingKey::AiEnabled => {}
    }
    Ok(value)
}

/// 获取公开系统设置（只读）
pub async fn get_settings(
    service: &SystemService,
    _request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let config = service.get_config();

    let response = SystemSettingsResponse {
        system_name: DynamicConfig::system_name().await,
        passing_score: DynamicConfig::passing_score().await,
        ai_enabled: DynamicConfig::ai_enabled().await,
        environment: config.app.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        started_at: started_at(),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "Settings retrieved successfully",
    )))
}

/// 获取所有管理员配置
pub async fn get_admin_settings(
    service: &SystemService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_all_settings().await {
        Ok(settings) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            AdminSettingsListResponse { settings },
            "Admin settings retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list settings: {e}"),
            )),
        ),
    }
}

/// 更新单个配置
pub async fn update_setting(
    service: &SystemService,
    request: &HttpRequest,
    key: String,
    data: UpdateSettingRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    match storage.get_setting_by_key(&key).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error_empty(
                ErrorCode::SettingNotFound,
                format!("Setting '{key}' not found"),
            )));
        }
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to load setting: {e}"),
                )),
            );
        }
    }

    let value = match validate_setting(&key, &data.value) {
        Ok(v) => v,
        Err(msg) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::<()>::error_empty(ErrorCode::SettingValueInvalid, msg)));
        }
    };

    let setting = match storage
        .update_setting(&key, &value, user_id, client_ip(request))
        .await
    {
        Ok(s) => s,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to update setting: {e}"),
                )),
            );
        }
    };

    // 更新缓存
    DynamicConfig::update(&key, &value).await;
    info!("Setting {} updated by user {}", key, user_id);

    log_admin_activity(
        &storage,
        request,
        ActivityAction::UpdateSetting,
        format!("Updated setting {key} to '{value}'"),
        ActivityTarget::default(),
    )
    .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        SettingResponse { setting },
        "Setting updated successfully",
    )))
}

/// 批量更新，任一项无效时全部不写入
pub async fn batch_update_settings(
    service: &SystemService,
    request: &HttpRequest,
    data: BatchUpdateSettingsRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let Some(user_id) = RequireJWT::extract_user_id(request) else {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::<()>::error_empty(
            ErrorCode::Unauthorized,
            "Authentication required",
        )));
    };

    let mut updates = Vec::with_capacity(data.settings.len());
    for item in data.settings {
        match validate_setting(&item.key, &item.value) {
            Ok(value) => updates.push((item.key, value)),
            Err(msg) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error_empty(
                    ErrorCode::SettingValueInvalid,
                    format!("{}: {msg}", item.key),
                )));
            }
        }
    }

    let settings = match storage
        .batch_update_settings(updates.clone(), user_id, client_ip(request))
        .await
    {
        Ok(s) => s,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to update settings: {e}"),
                )),
            );
        }
    };

    for (key, value) in &updates {
        DynamicConfig::update(key, value).await;
    }

    let keys: Vec<&str> = updates.iter().map(|(k, _)| k.as_str()).collect();
    log_admin_activity(
        &storage,
        request,
        ActivityAction::UpdateSetting,
        format!("Updated settings: {}", keys.join(", ")),
        ActivityTarget::default(),
    )
    .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        AdminSettingsListResponse { settings },
        "Settings updated successfully",
    )))
}

/// 获取审计日志
pub async fn get_setting_audits(
    service: &SystemService,
    request: &HttpRequest,
    query: SettingAuditQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.list_setting_audits(query).await {
        Ok(audits) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            audits,
            "Setting audits retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to list setting audits: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_setting() {
        assert_eq!(
            validate_setting("evaluation.passing_score", " 75 ").unwrap(),
            "75"
        );
        assert!(validate_setting("evaluation.passing_score", "120").is_err());
        assert!(validate_setting("evaluation.max_failure_attempts", "0").is_err());
        assert!(validate_setting("ai.enabled", "maybe").is_err());
        assert!(validate_setting("upload.max_size", "1").is_err());
        assert_eq!(
            validate_setting("mail.school_head_email", "Head@CCA.edu.ph").unwrap(),
            "head@cca.edu.ph"
        );
        assert_eq!(validate_setting("mail.school_head_email", "").unwrap(), "");
    }
}
