use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::evaluations::entities::EvaluationType;

// 评语情感倾向
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/recommendation.ts")]
pub enum Sentiment {
    Positive,
    Negative,
    Mixed,
    Neutral,
}

// 建议优先级
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/recommendation.ts")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// 按出现顺序分配优先级
    pub fn for_position(index: usize) -> Self {
        match index {
            0 => Priority::High,
            1 => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "High"),
            Priority::Medium => write!(f, "Medium"),
            Priority::Low => write!(f, "Low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "High" => Ok(Priority::High),
            "Medium" => Ok(Priority::Medium),
            "Low" => Ok(Priority::Low),
            _ => Err(format!("Invalid priority: {s}")),
        }
    }
}

// 改进建议
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/recommendation.ts")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub reason: Option<String>,
}

// 已保存的建议
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/recommendation.ts")]
pub struct StoredRecommendation {
    pub id: i64,
    pub user_id: i64,
    pub evaluation_period_id: i64,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub reason: Option<String>,
    pub evaluation_type: EvaluationType,
    pub section_code: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
