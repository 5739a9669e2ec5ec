//! 评估结果实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluation_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub evaluation_period_id: i64,
    pub section_id: Option<i64>,
    pub category_a_score: f64,
    pub category_b_score: f64,
    pub category_c_score: f64,
    pub category_d_score: f64,
    pub total_percentage: f64,
    pub average_rating: f64,
    pub total_responses: i32,
    pub poor_count: i32,
    pub unsatisfactory_count: i32,
    pub satisfactory_count: i32,
    pub very_satisfactory_count: i32,
    pub outstanding_count: i32,
    pub calculated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::evaluation_periods::Entity",
        from = "Column::EvaluationPeriodId",
        to = "super::evaluation_periods::Column::Id",
        on_delete = "Cascade"
    )]
    EvaluationPeriod,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::evaluation_periods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationPeriod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_result(self) -> crate::models::results::entities::EvaluationResult {
        use crate::models::results::entities::{
            CategoryScores, EvaluationResult, RatingDistribution,
        };

        EvaluationResult {
            id: self.id,
            user_id: self.user_id,
            evaluation_period_id: self.evaluation_period_id,
            section_id: self.section_id,
            scores: CategoryScores {
                category_a: self.category_a_score,
                category_b: self.category_b_score,
                category_c: self.category_c_score,
                category_d: self.category_d_score,
                total: self.total_percentage,
            },
            total_percentage: self.total_percentage,
            average_rating: self.average_rating,
            total_responses: self.total_responses,
            distribution: RatingDistribution {
                poor: self.poor_count,
                unsatisfactory: self.unsatisfactory_count,
                satisfactory: self.satisfactory_count,
                very_satisfactory: self.very_satisfactory_count,
                outstanding: self.outstanding_count,
            },
            calculated_at: super::from_timestamp(self.calculated_at),
        }
    }
}
