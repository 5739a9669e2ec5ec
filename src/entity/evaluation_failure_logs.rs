//! 评估未通过记录实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "evaluation_failure_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub evaluation_period_id: Option<i64>,
    pub score: f64,
    pub passing_score: f64,
    pub evaluation_date: i64,
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
    pub fn into_failure_log(self) -> crate::models::results::entities::FailureLog {
        crate::models::results::entities::FailureLog {
            id: self.id,
            user_id: self.user_id,
            evaluation_period_id: self.evaluation_period_id,
            score: self.score,
            passing_score: self.passing_score,
            evaluation_date: super::from_timestamp(self.evaluation_date),
        }
    }
}
