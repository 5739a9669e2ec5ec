//! AI 建议实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ai_recommendations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub evaluation_period_id: i64,
    pub title: String,
    pub description: String,
    pub priority: String,
    pub reason: Option<String>,
    pub evaluation_type: String,
    pub section_code: Option<String>,
    pub created_at: i64,
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
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_recommendation(
        self,
    ) -> crate::models::recommendations::entities::StoredRecommendation {
        use crate::models::evaluations::entities::EvaluationType;
        use crate::models::recommendations::entities::{Priority, StoredRecommendation};

        StoredRecommendation {
            id: self.id,
            user_id: self.user_id,
            evaluation_period_id: self.evaluation_period_id,
            title: self.title,
            description: self.description,
            priority: self.priority.parse::<Priority>().unwrap_or(Priority::Medium),
            reason: self.reason,
            evaluation_type: self
                .evaluation_type
                .parse::<EvaluationType>()
                .unwrap_or(EvaluationType::Student),
            section_code: self.section_code,
            created_at: super::from_timestamp(self.created_at),
        }
    }
}
