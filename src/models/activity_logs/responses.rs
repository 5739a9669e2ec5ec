use serde::Serialize;
use ts_rs::TS;

use super::entities::{ActivityAction, AdminActivityLog};
use crate::models::common::PaginationInfo;

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/activity_log.ts")]
pub struct ActionCount {
    pub action: ActivityAction,
    pub count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/activity_log.ts")]
pub struct ActivityLogListResponse {
    pub items: Vec<AdminActivityLog>,
    pub pagination: PaginationInfo,
    pub action_stats: Vec<ActionCount>,
    pub retention_days: i64,
    pub next_cleanup: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/activity_log.ts")]
pub struct CleanupResponse {
    pub deleted: u64,
    pub cutoff: chrono::DateTime<chrono::Utc>,
}
