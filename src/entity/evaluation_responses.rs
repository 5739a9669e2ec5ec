//! 评估答卷实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluation_responses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub evaluator_id: i64,
    pub evaluatee_id: i64,
    pub evaluation_period_id: i64,
    pub evaluation_type: String,
    pub student_number: Option<String>,
    pub student_section: String,
    pub comments: Option<String>,
    /// JSON 数组
    pub ratings: String,
    pub submitted_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::evaluation_periods::Entity",
        from = "Column::EvaluationPeriodId",
        to = "super::evaluation_periods::Column::Id",
        on_delete = "Cascade"
    )]
    EvaluationPeriod,
}

impl Related<super::evaluation_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationPeriod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_response(self) -> crate::models::evaluations::entities::EvaluationResponse {
        use crate::models::evaluations::entities::{EvaluationResponse, EvaluationType};

        EvaluationResponse {
            id: self.id,
            evaluator_id: self.evaluator_id,
            evaluatee_id: self.evaluatee_id,
            evaluation_period_id: self.evaluation_period_id,
            evaluation_type: self
                .evaluation_type
                .parse::<EvaluationType>()
                .unwrap_or(EvaluationType::Student),
            student_number: self.student_number,
            student_section: self.student_section,
            comments: self.comments,
            ratings: super::parse_ratings(&self.ratings),
            submitted_at: super::from_timestamp(self.submitted_at),
        }
    }
}
