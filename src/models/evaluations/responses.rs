use serde::Serialize;
use ts_rs::TS;

use super::entities::{EvaluationPeriod, EvaluationQuestion, EvaluationType};
use crate::models::common::PaginationInfo;
use crate::models::users::entities::UserRole;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct SubmitEvaluationResponse {
    pub response_id: i64,
    pub evaluation_type: EvaluationType,
    pub irregular: bool,
}

// 可评估对象
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluateeItem {
    pub id: i64,
    pub display_name: String,
    pub role: UserRole,
    pub institute: Option<String>,
    pub already_evaluated: bool,
}

// 评估表
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationFormResponse {
    pub evaluation_type: EvaluationType,
    pub period: EvaluationPeriod,
    pub questions: Vec<EvaluationQuestion>,
    pub evaluatees: Vec<EvaluateeItem>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EmailNotificationSummary {
    pub sent: usize,
    pub failed: usize,
    pub message: String,
}

// 发布评估结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ReleaseResponse {
    pub success: bool,
    pub message: String,
    pub periods_archived: usize,
    pub new_period: EvaluationPeriod,
    pub email_notification: EmailNotificationSummary,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ProcessingResults {
    pub success: bool,
    pub processed_count: usize,
    pub total_staff: usize,
    pub details: Vec<String>,
    pub evaluation_period: Option<String>,
}

// 收回评估结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct UnreleaseResponse {
    pub success: bool,
    pub message: String,
    pub processing_results: ProcessingResults,
    pub email_notification: EmailNotificationSummary,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct BulkReleaseItem {
    pub evaluation_type: EvaluationType,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct BulkReleaseResponse {
    pub items: Vec<BulkReleaseItem>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ReleaseState {
    pub is_released: bool,
    /// 发布期间不可查看结果
    pub can_view_results: bool,
    pub period: Option<EvaluationPeriod>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ReleaseStatusResponse {
    pub student: ReleaseState,
    pub peer: ReleaseState,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct QuestionListResponse {
    pub evaluation_type: EvaluationType,
    pub items: Vec<EvaluationQuestion>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct PeriodListResponse {
    pub items: Vec<EvaluationPeriod>,
    pub pagination: PaginationInfo,
}
