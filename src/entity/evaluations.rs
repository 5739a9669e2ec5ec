//! 评估发布开关实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub evaluation_type: String,
    pub is_released: bool,
    pub evaluation_period_id: Option<i64>,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::evaluation_periods::Entity",
        from = "Column::EvaluationPeriodId",
        to = "super::evaluation_periods::Column::Id",
        on_delete = "SetNull"
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
    pub fn into_evaluation(self) -> crate::models::evaluations::entities::Evaluation {
        use crate::models::evaluations::entities::{Evaluation, EvaluationType};

        Evaluation {
            id: self.id,
            evaluation_type: self
                .evaluation_type
                .parse::<EvaluationType>()
                .unwrap_or(EvaluationType::Student),
            is_released: self.is_released,
            evaluation_period_id: self.evaluation_period_id,
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
