//! 非正常班学生答卷实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "irregular_evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub evaluator_id: i64,
    pub evaluatee_id: i64,
    pub evaluation_period_id: i64,
    pub student_number: Option<String>,
    pub comments: Option<String>,
    pub ratings: String,
    pub submitted_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_irregular(self) -> crate::models::evaluations::entities::IrregularEvaluation {
        crate::models::evaluations::entities::IrregularEvaluation {
            id: self.id,
            evaluator_id: self.evaluator_id,
            evaluatee_id: self.evaluatee_id,
            evaluation_period_id: self.evaluation_period_id,
            student_number: self.student_number,
            comments: self.comments,
            ratings: super::parse_ratings(&self.ratings),
            submitted_at: super::from_timestamp(self.submitted_at),
        }
    }
}
