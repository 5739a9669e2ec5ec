//! 评估题目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluation_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub evaluation_type: String,
    pub question_number: i32,
    pub question_text: String,
    pub is_active: bool,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_question(self) -> crate::models::evaluations::entities::EvaluationQuestion {
        use crate::models::evaluations::entities::{EvaluationQuestion, EvaluationType};

        EvaluationQuestion {
            id: self.id,
            evaluation_type: self
                .evaluation_type
                .parse::<EvaluationType>()
                .unwrap_or(EvaluationType::Student),
            question_number: self.question_number,
            question_text: self.question_text,
            is_active: self.is_active,
            updated_at: super::from_timestamp(self.updated_at),
        }
    }
}
