//! SeaORM 实体定义
//!
//! 这些实体用于数据库操作，与 models 模块中的业务实体分离。
//! Storage 层使用这些实体进行 CRUD 操作，然后转换为 models 中的业务实体。
//! 时间统一以 Unix 秒存储。

pub mod prelude;

pub mod admin_activity_logs;
pub mod ai_recommendations;
pub mod evaluation_failure_logs;
pub mod evaluation_history;
pub mod evaluation_periods;
pub mod evaluation_questions;
pub mod evaluation_responses;
pub mod evaluation_results;
pub mod evaluations;
pub mod irregular_evaluations;
pub mod section_assignments;
pub mod sections;
pub mod system_settings;
pub mod system_settings_audit;
pub mod users;

use chrono::{DateTime, Utc};

pub(crate) fn from_timestamp(ts: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(ts, 0).unwrap_or_default()
}

/// 评分以 JSON 数组存储
pub(crate) fn parse_ratings(raw: &str) -> Vec<i32> {
    serde_json::from_str(raw).unwrap_or_default()
}
