use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 评估类型
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub enum EvaluationType {
    Student, // 学生评教师
    Peer,    // 同事互评
    Upward,  // 下级评上级
}

impl EvaluationType {
    pub const STUDENT: &'static str = "student";
    pub const PEER: &'static str = "peer";
    pub const UPWARD: &'static str = "upward";

    /// 可发布/收回的评估表
    pub fn releasable() -> &'static [EvaluationType] {
        &[EvaluationType::Student, EvaluationType::Peer]
    }

    pub fn label(&self) -> &'static str {
        match self {
            EvaluationType::Student => "Student",
            EvaluationType::Peer => "Peer",
            EvaluationType::Upward => "Upward",
        }
    }

    /// 表单题目数量
    pub fn question_count(&self) -> usize {
        match self {
            EvaluationType::Student => 19,
            EvaluationType::Peer | EvaluationType::Upward => 15,
        }
    }

    /// 新周期名称，例如 "Student Evaluation March 2025"
    pub fn period_name(&self, at: chrono::DateTime<chrono::Utc>) -> String {
        format!("{} Evaluation {}", self.label(), at.format("%B %Y"))
    }
}

impl<'de> Deserialize<'de> for EvaluationType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的评估类型: '{s}'. 支持的类型: student, peer, upward"
            ))
        })
    }
}

impl std::fmt::Display for EvaluationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluationType::Student => write!(f, "{}", EvaluationType::STUDENT),
            EvaluationType::Peer => write!(f, "{}", EvaluationType::PEER),
            EvaluationType::Upward => write!(f, "{}", EvaluationType::UPWARD),
        }
    }
}

impl std::str::FromStr for EvaluationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            EvaluationType::STUDENT => Ok(EvaluationType::Student),
            EvaluationType::PEER => Ok(EvaluationType::Peer),
            EvaluationType::UPWARD => Ok(EvaluationType::Upward),
            _ => Err(format!("Invalid evaluation type: {s}")),
        }
    }
}

// 评分等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingLevel {
    Poor = 1,
    Unsatisfactory = 2,
    Satisfactory = 3,
    VerySatisfactory = 4,
    Outstanding = 5,
}

impl RatingLevel {
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(RatingLevel::Poor),
            2 => Some(RatingLevel::Unsatisfactory),
            3 => Some(RatingLevel::Satisfactory),
            4 => Some(RatingLevel::VerySatisfactory),
            5 => Some(RatingLevel::Outstanding),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RatingLevel::Poor => "Poor",
            RatingLevel::Unsatisfactory => "Unsatisfactory",
            RatingLevel::Satisfactory => "Satisfactory",
            RatingLevel::VerySatisfactory => "Very Satisfactory",
            RatingLevel::Outstanding => "Outstanding",
        }
    }
}

// 评估周期
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationPeriod {
    pub id: i64,
    pub name: String,
    pub evaluation_type: EvaluationType,
    pub start_date: chrono::DateTime<chrono::Utc>,
    pub end_date: chrono::DateTime<chrono::Utc>,
    pub is_active: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

// 评估表发布状态（每种类型一条）
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct Evaluation {
    pub id: i64,
    pub evaluation_type: EvaluationType,
    pub is_released: bool,
    pub evaluation_period_id: Option<i64>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 评估题目
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationQuestion {
    pub id: i64,
    pub evaluation_type: EvaluationType,
    pub question_number: i32,
    pub question_text: String,
    pub is_active: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 评估答卷
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct EvaluationResponse {
    pub id: i64,
    pub evaluator_id: i64,
    pub evaluatee_id: i64,
    pub evaluation_period_id: i64,
    pub evaluation_type: EvaluationType,
    pub student_number: Option<String>,
    /// 学生所在班级代码，教职工为 "{学院} Staff"
    pub student_section: String,
    pub comments: Option<String>,
    /// 第 i 项为第 i+1 题的评分（1-5）
    pub ratings: Vec<i32>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

// 非正常班学生答卷
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/evaluation.ts")]
pub struct IrregularEvaluation {
    pub id: i64,
    pub evaluator_id: i64,
    pub evaluatee_id: i64,
    pub evaluation_period_id: i64,
    pub student_number: Option<String>,
    pub comments: Option<String>,
    pub ratings: Vec<i32>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

/// 新答卷（存储层输入）
#[derive(Debug, Clone)]
pub struct NewEvaluationResponse {
    pub evaluator_id: i64,
    pub evaluatee_id: i64,
    pub evaluation_period_id: i64,
    pub evaluation_type: EvaluationType,
    pub student_number: Option<String>,
    pub student_section: String,
    pub comments: Option<String>,
    pub ratings: Vec<i32>,
}

/// 参与计分的答卷视图，正常答卷与非正常班答卷共用
#[derive(Debug, Clone)]
pub struct ScoredResponse {
    pub ratings: Vec<i32>,
    pub comments: Option<String>,
    pub student_section: String,
}

impl From<EvaluationResponse> for ScoredResponse {
    fn from(r: EvaluationResponse) -> Self {
        Self {
            ratings: r.ratings,
            comments: r.comments,
            student_section: r.student_section,
        }
    }
}

impl From<IrregularEvaluation> for ScoredResponse {
    fn from(r: IrregularEvaluation) -> Self {
        Self {
            ratings: r.ratings,
            comments: r.comments,
            student_section: "Irregular".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_period_name_uses_month_and_year() {
        let at = chrono::Utc.with_ymd_and_hms(2025, 3, 14, 8, 0, 0).unwrap();
        assert_eq!(
            EvaluationType::Student.period_name(at),
            "Student Evaluation March 2025"
        );
        assert_eq!(EvaluationType::Peer.period_name(at), "Peer Evaluation March 2025");
    }

    #[test]
    fn test_rating_level_bounds() {
        assert_eq!(RatingLevel::from_value(5), Some(RatingLevel::Outstanding));
        assert_eq!(RatingLevel::from_value(0), None);
        assert_eq!(RatingLevel::from_value(6), None);
        assert_eq!(RatingLevel::VerySatisfactory.label(), "Very Satisfactory");
    }

    #[test]
    fn test_question_count_per_type() {
        assert_eq!(EvaluationType::Student.question_count(), 19);
        assert_eq!(EvaluationType::Peer.question_count(), 15);
    }
}
