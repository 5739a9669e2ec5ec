use serde::Serialize;
use ts_rs::TS;

use super::entities::{Recommendation, StoredRecommendation};
use crate::models::evaluations::entities::EvaluationType;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/recommendation.ts")]
pub enum RecommendationSource {
    Ai,
    Fallback,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/recommendation.ts")]
pub struct RecommendationMetadata {
    pub source: RecommendationSource,
    pub evaluation_type: EvaluationType,
    pub section: String,
    pub evaluation_period_id: Option<i64>,
    pub total_responses: usize,
    pub overall_score: f64,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/recommendation.ts")]
pub struct RecommendationResponse {
    pub recommendations: Vec<Recommendation>,
    pub metadata: RecommendationMetadata,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/recommendation.ts")]
pub struct StoredRecommendationListResponse {
    pub items: Vec<StoredRecommendation>,
}
