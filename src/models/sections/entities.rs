use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 班级
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct Section {
    pub id: i64,
    /// 班级代码，例如 BSIT-3A
    pub code: String,
    pub name: Option<String>,
    pub year_level: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 教职工任课班级
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/section.ts")]
pub struct SectionAssignment {
    pub id: i64,
    pub user_id: i64,
    pub section_id: i64,
    pub section_code: String,
    pub assigned_at: chrono::DateTime<chrono::Utc>,
}
