//! 教职工未通过统计与重置

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ResultService;
use crate::errors::Result;
use crate::middlewares::require_jwt::invalidate_user_cache;
use crate::models::activity_logs::entities::ActivityAction;
use crate::models::results::entities::FailureStats;
use crate::models::results::requests::ResetFailuresRequest;
use crate::models::results::responses::{FailureStatsListResponse, ResetFailuresResponse};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::activity_logs::{log::ActivityTarget, log_admin_activity};
use crate::services::system::DynamicConfig;
use crate::storage::Storage;

/// 每人展示的最近未通过记录数
const RECENT_FAILURES: u64 = 5;

pub async fn collect_failure_stats(storage: &Arc<dyn Storage>) -> Result<Vec<FailureStats>> {
    let roles: Vec<UserRole> = UserRole::staff_roles()
        .iter()
        .map(|r| (*r).clone())
        .collect();
    let staff = storage.list_users_by_roles(&roles).await?;

    let mut stats = Vec::with_capacity(staff.len());
    for user in staff {
        let recent_failures = storage.list_failure_logs(user.id, RECENT_FAILURES).await?;
        let latest = storage.get_latest_result_for_user(user.id).await?;
        stats.push(FailureStats {
            user_id: user.id,
            username: user.username.clone(),
            display_name: user.display_name().to_string(),
            role: user.role.clone(),
            failure_count: user.failure.failure_count,
            last_failure_date: user.failure.last_failure_date,
            alert_sent: user.failure.alert_sent,
            recent_failures,
            overall_score: latest.as_ref().map(|r| r.total_percentage),
            has_evaluations: latest.is_some(),
        });
    }

    // 未通过次数多的排在前面
    stats.sort_by(|a, b| {
        b.failure_count
            .cmp(&a.failure_count)
            .then_with(|| a.username.cmp(&b.username))
    });
    Ok(stats)
}

pub async fn failure_stats(
    service: &ResultService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match collect_failure_stats(&storage).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            FailureStatsListResponse {
                items,
                passing_score: DynamicConfig::passing_score().await,
                max_failure_attempts: DynamicConfig::max_failure_attempts().await,
            },
            "Failure statistics retrieved successfully",
        ))),
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to retrieve failure statistics: {e}"),
            )),
        ),
    }
}

pub async fn reset_failures(
    service: &ResultService,
    request: &HttpRequest,
    data: ResetFailuresRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let cache = service.get_cache(request);

    // 空列表表示全部，同时清空未通过记录
    let user_ids = (!data.user_ids.is_empty()).then(|| data.user_ids.clone());

    let reset_count = match storage.reset_evaluation_failures(user_ids.clone()).await {
        Ok(count) => count,
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Failed to reset evaluation failures: {e}"),
                )),
            );
        }
    };

    // 缓存中的用户信息带有未通过次数
    match &user_ids {
        Some(ids) => {
            for id in ids {
                invalidate_user_cache(&cache, *id).await;
            }
        }
        None => cache.invalidate_all().await,
    }

    let description = match &user_ids {
        Some(ids) => format!("Reset evaluation failures for {} user(s)", ids.len()),
        None => "Reset evaluation failures for all users".to_string(),
    };
    info!("{}, {} record(s) affected", description, reset_count);

    let target = match user_ids.as_deref() {
        Some([id]) => ActivityTarget::user(*id),
        _ => ActivityTarget::default(),
    };
    log_admin_activity(
        &storage,
        request,
        ActivityAction::ResetFailures,
        description,
        target,
    )
    .await;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ResetFailuresResponse { reset_count },
        "Evaluation failures reset successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserProfile;
    use crate::models::users::requests::CreateUserRequest;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    #[tokio::test]
    async fn test_stats_sorted_by_failure_count() {
        let storage: Arc<dyn Storage> = Arc::new(SeaOrmStorage::new_in_memory().await.unwrap());
        let mut users = Vec::new();
        for (name, role) in [
            ("alpha", UserRole::Faculty),
            ("bravo", UserRole::Dean),
            ("student", UserRole::Student),
        ] {
            users.push(
                storage
                    .create_user(CreateUserRequest {
                        username: name.to_string(),
                        email: format!("{name}@cca.edu.ph"),
                        password: "hash".to_string(),
                        role,
                        profile: UserProfile {
                            display_name: name.to_string(),
                            ..Default::default()
                        },
                    })
                    .await
                    .unwrap(),
            );
        }

        storage
            .record_evaluation_failure(users[1].id, None, 55.0, 70.0)
            .await
            .unwrap();

        let stats = collect_failure_stats(&storage).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].username, "bravo");
        assert_eq!(stats[0].failure_count, 1);
        assert_eq!(stats[0].recent_failures.len(), 1);
        assert!(!stats[0].has_evaluations);
        assert_eq!(stats[1].failure_count, 0);

        storage
            .reset_evaluation_failures(Some(vec![users[1].id]))
            .await
            .unwrap();
        let stats = collect_failure_stats(&storage).await.unwrap();
        assert!(stats.iter().all(|s| s.failure_count == 0));
    }
}
