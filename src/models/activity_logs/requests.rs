use serde::Deserialize;
use ts_rs::TS;

use super::entities::ActivityAction;

// 未指定 size 时每页 50 条
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/activity_log.ts")]
pub struct ActivityLogListParams {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub action: Option<ActivityAction>,
}

// 存储层查询参数
#[derive(Debug, Clone, Default)]
pub struct ActivityLogListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub action: Option<ActivityAction>,
}
