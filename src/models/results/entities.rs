use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::evaluations::entities::EvaluationType;
use crate::models::recommendations::entities::Sentiment;
use crate::models::users::entities::UserRole;

// 评分分布（第 1-15 题）
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct RatingDistribution {
    pub poor: i32,
    pub unsatisfactory: i32,
    pub satisfactory: i32,
    pub very_satisfactory: i32,
    pub outstanding: i32,
}

// 四个类别的加权得分
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct CategoryScores {
    pub category_a: f64,
    pub category_b: f64,
    pub category_c: f64,
    pub category_d: f64,
    pub total: f64,
}

impl CategoryScores {
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.category_a,
            self.category_b,
            self.category_c,
            self.category_d,
        ]
    }
}

// 周期评估结果
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct EvaluationResult {
    pub id: i64,
    pub user_id: i64,
    pub evaluation_period_id: i64,
    pub section_id: Option<i64>,
    pub scores: CategoryScores,
    pub total_percentage: f64,
    pub average_rating: f64,
    pub total_responses: i32,
    pub distribution: RatingDistribution,
    pub calculated_at: chrono::DateTime<chrono::Utc>,
}

/// 结果写入（存储层输入）
#[derive(Debug, Clone)]
pub struct ResultUpsert {
    pub user_id: i64,
    pub evaluation_period_id: i64,
    pub section_id: Option<i64>,
    pub scores: CategoryScores,
    pub average_rating: f64,
    pub total_responses: i32,
    pub distribution: RatingDistribution,
}

// 历史快照
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct EvaluationHistory {
    pub id: i64,
    pub user_id: i64,
    pub evaluation_period_id: i64,
    pub section_id: Option<i64>,
    pub evaluation_type: EvaluationType,
    pub period_name: String,
    pub period_start: chrono::DateTime<chrono::Utc>,
    pub period_end: chrono::DateTime<chrono::Utc>,
    pub scores: CategoryScores,
    pub total_percentage: f64,
    pub average_rating: f64,
    pub total_responses: i32,
    pub distribution: RatingDistribution,
    pub archived_at: chrono::DateTime<chrono::Utc>,
}

// 未通过记录
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct FailureLog {
    pub id: i64,
    pub user_id: i64,
    pub evaluation_period_id: Option<i64>,
    pub score: f64,
    pub passing_score: f64,
    pub evaluation_date: chrono::DateTime<chrono::Utc>,
}

// 教职工未通过统计
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct FailureStats {
    pub user_id: i64,
    pub username: String,
    pub display_name: String,
    pub role: UserRole,
    pub failure_count: i32,
    pub last_failure_date: Option<chrono::DateTime<chrono::Utc>>,
    pub alert_sent: bool,
    pub recent_failures: Vec<FailureLog>,
    pub overall_score: Option<f64>,
    pub has_evaluations: bool,
}

// 单题得分
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct QuestionScore {
    pub question_number: i32,
    pub question_text: String,
    /// 平均分（0-5）
    pub average: f64,
    /// 百分比（0-100）
    pub percentage: f64,
}

// 类别得分明细
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct CategoryBreakdown {
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    /// 占满分百分比
    pub performance: f64,
}

// 匿名评语
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/result.ts")]
pub struct AnonymousComment {
    pub comment: String,
    pub sentiment: Sentiment,
    pub section: String,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}
