use serde::Deserialize;
use ts_rs::TS;

use super::entities::EvaluationType;
use crate::models::common::PaginationQuery;

// 提交评估
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct SubmitEvaluationRequest {
    pub evaluatee_id: i64,
    /// 按题号顺序的评分
    pub ratings: Vec<i32>,
    #[serde(default)]
    pub comments: Option<String>,
    /// 未填写时使用档案中的学号
    #[serde(default)]
    pub student_number: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct PeriodListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub evaluation_type: Option<EvaluationType>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct QuestionListParams {
    pub evaluation_type: EvaluationType,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct UpdateQuestionRequest {
    pub question_text: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct BulkUpdateQuestionsRequest {
    pub evaluation_type: EvaluationType,
    pub questions: Vec<QuestionTextItem>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct QuestionTextItem {
    pub question_number: i32,
    pub question_text: String,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct ResetQuestionsRequest {
    pub evaluation_type: EvaluationType,
}
