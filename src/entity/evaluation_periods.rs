//! 评估周期实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluation_periods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub evaluation_type: String,
    pub start_date: i64,
    pub end_date: i64,
    pub is_active: bool,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::evaluation_responses::Entity")]
    EvaluationResponses,
    #[sea_orm(has_many = "super::evaluation_results::Entity")]
    EvaluationResults,
}

impl Related<super::evaluation_responses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationResponses.def()
    }
}

impl Related<super::evaluation_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationResults.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_period(self) -> crate::models::evaluations::entities::EvaluationPeriod {
        use crate::models::evaluations::entities::{EvaluationPeriod, EvaluationType};

        EvaluationPeriod {
            id: self.id,
            name: self.name,
            evaluation_type: self
                .evaluation_type
                .parse::<EvaluationType>()
                .unwrap_or(EvaluationType::Student),
            start_date: super::from_timestamp(self.start_date),
            end_date: super::from_timestamp(self.end_date),
            is_active: self.is_active,
            created_at: super::from_timestamp(self.created_at),
        }
    }
}
