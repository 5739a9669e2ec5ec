use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::{ActivityLogService, log::{ActivityTarget, log_admin_activity}};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{
    ApiResponse, ErrorCode,
    activity_logs::{entities::ActivityAction, responses::CleanupResponse},
};
use crate::services::system::DynamicConfig;
use crate::storage::Storage;

/// 上次清理时间（Unix 秒），0 表示尚未清理
static LAST_CLEANUP: AtomicI64 = AtomicI64::new(0);

/// 保留天数之前的时间点
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: i64) -> DateTime<Utc> {
    now - chrono::Duration::days(retention_days.max(1))
}

/// 下一次自动清理时间
pub fn next_cleanup_at() -> DateTime<Utc> {
    let interval = AppConfig::get().activity_log.cleanup_interval as i64;
    let last = LAST_CLEANUP.load(Ordering::Relaxed);
    let now = Utc::now().timestamp();
    let next = if last == 0 { now } else { last + interval };
    DateTime::from_timestamp(next.max(now), 0).unwrap_or_else(Utc::now)
}

/// 删除超过保留期的日志
pub async fn cleanup_old_logs(storage: &Arc<dyn Storage>) -> Result<(u64, DateTime<Utc>)> {
    let retention_days = DynamicConfig::activity_log_retention_days().await;
    let cutoff = retention_cutoff(Utc::now(), retention_days);
    let deleted = storage.delete_activity_logs_before(cutoff).await?;
    LAST_CLEANUP.store(Utc::now().timestamp(), Ordering::Relaxed);
    if deleted > 0 {
        info!(
            "Deleted {} admin activity log(s) older than {} days",
            deleted, retention_days
        );
    }
    Ok((deleted, cutoff))
}

/// 后台定时清理
pub fn spawn_cleanup_task(storage: Arc<dyn Storage>) {
    let interval = AppConfig::get().activity_log.cleanup_interval.max(60);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval));
        loop {
            ticker.tick().await;
            if let Err(e) = cleanup_old_logs(&storage).await {
                warn!("Scheduled activity log cleanup failed: {}", e);
            }
        }
    });
}

pub async fn handle_cleanup(
    service: &ActivityLogService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match cleanup_old_logs(&storage).await {
        Ok((deleted, cutoff)) => {
            log_admin_activity(
                &storage,
                request,
                ActivityAction::CleanupLogs,
                format!("Deleted {deleted} activity log(s) older than {cutoff}"),
                ActivityTarget::default(),
            )
            .await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                CleanupResponse { deleted, cutoff },
                "Old activity logs cleaned up",
            )))
        }
        Err(e) => Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("清理操作日志失败: {e}"),
            )),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_retention_cutoff() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(
            retention_cutoff(now, 7),
            Utc.with_ymd_and_hms(2025, 3, 3, 12, 0, 0).unwrap()
        );
        // 保留期至少一天
        assert_eq!(
            retention_cutoff(now, 0),
            Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_cleanup_is_not_in_the_past() {
        assert!(next_cleanup_at() >= Utc::now() - chrono::Duration::seconds(1));
    }
}
