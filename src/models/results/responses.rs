use serde::Serialize;
use ts_rs::TS;

use super::entities::{
    AnonymousComment, CategoryBreakdown, EvaluationHistory, EvaluationResult, FailureStats,
    QuestionScore, RatingDistribution,
};
use crate::models::common::PaginationInfo;
use crate::models::evaluations::entities::{EvaluationPeriod, EvaluationType};

// 实时计算的结果
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ResultSummaryResponse {
    pub user_id: i64,
    pub evaluation_type: EvaluationType,
    pub section: Option<String>,
    pub period: Option<EvaluationPeriod>,
    pub categories: Vec<CategoryBreakdown>,
    pub total_percentage: f64,
    pub average_rating: f64,
    pub total_responses: usize,
    pub distribution: RatingDistribution,
    pub question_scores: Vec<QuestionScore>,
    /// 达到及格分数
    pub passed: bool,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ResultListResponse {
    pub items: Vec<EvaluationResult>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct HistoryListResponse {
    pub items: Vec<EvaluationHistory>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Default, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct SentimentCounts {
    pub positive: usize,
    pub negative: usize,
    pub mixed: usize,
    pub neutral: usize,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct CommentListResponse {
    pub items: Vec<AnonymousComment>,
    pub counts: SentimentCounts,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct FailureStatsListResponse {
    pub items: Vec<FailureStats>,
    pub passing_score: f64,
    pub max_failure_attempts: i32,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct ResetFailuresResponse {
    pub reset_count: u64,
}
