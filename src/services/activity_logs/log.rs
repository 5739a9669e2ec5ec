use std::sync::Arc;

use actix_web::HttpRequest;
use tracing::{debug, warn};

use crate::middlewares::RequireJWT;
use crate::models::activity_logs::entities::{ActivityAction, NewActivityLog};
use crate::storage::Storage;
use crate::utils::client_ip;

/// 操作涉及的对象
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityTarget {
    pub user_id: Option<i64>,
    pub section_id: Option<i64>,
}

impl ActivityTarget {
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            section_id: None,
        }
    }

    pub fn section(section_id: i64) -> Self {
        Self {
            user_id: None,
            section_id: Some(section_id),
        }
    }
}

/// 记录管理员操作，写入失败只记日志，不影响请求结果
pub async fn log_admin_activity(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    action: ActivityAction,
    description: impl Into<String>,
    target: ActivityTarget,
) {
    let log = NewActivityLog {
        admin_id: RequireJWT::extract_user_id(request),
        action,
        target_user_id: target.user_id,
        target_section_id: target.section_id,
        description: description.into(),
        ip_address: client_ip(request),
    };

    match storage.create_activity_log(log).await {
        Ok(entry) => debug!("Recorded admin activity {} ({})", entry.id, action),
        Err(e) => warn!("Failed to record admin activity {}: {}", action, e),
    }
}
