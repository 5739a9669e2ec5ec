use serde::Deserialize;
use ts_rs::TS;

use crate::models::evaluations::entities::EvaluationType;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/recommendation.ts")]
pub struct RecommendationQuery {
    pub evaluation_type: Option<EvaluationType>,
    /// 班级代码，"Overall" 或为空表示所有班级
    pub section: Option<String>,
    pub period_id: Option<i64>,
}
