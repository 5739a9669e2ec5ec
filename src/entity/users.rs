//! 用户实体（含档案与未通过跟踪字段）

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub username: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub display_name: String,
    pub student_number: Option<String>,
    pub course: Option<String>,
    pub section_id: Option<i64>,
    pub institute: Option<String>,
    pub is_irregular: bool,
    pub evaluation_failure_count: i32,
    pub last_evaluation_failure_date: Option<i64>,
    pub failure_alert_sent: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sections::Entity",
        from = "Column::SectionId",
        to = "super::sections::Column::Id",
        on_delete = "SetNull"
    )]
    Section,
    #[sea_orm(has_many = "super::section_assignments::Entity")]
    SectionAssignments,
    #[sea_orm(has_many = "super::evaluation_results::Entity")]
    EvaluationResults,
    #[sea_orm(has_many = "super::evaluation_failure_logs::Entity")]
    EvaluationFailureLogs,
    #[sea_orm(has_many = "super::ai_recommendations::Entity")]
    AiRecommendations,
}

impl Related<super::sections::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Section.def()
    }
}

impl Related<super::section_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SectionAssignments.def()
    }
}

impl Related<super::evaluation_results::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationResults.def()
    }
}

impl Related<super::evaluation_failure_logs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvaluationFailureLogs.def()
    }
}

impl Related<super::ai_recommendations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AiRecommendations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    /// section 为 `find_also_related(Sections)` 取得的班级
    pub fn into_user(
        self,
        section: Option<super::sections::Model>,
    ) -> crate::models::users::entities::User {
        use crate::models::users::entities::{
            FailureTracking, User, UserProfile, UserRole, UserStatus,
        };
        use super::from_timestamp;

        User {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role.parse::<UserRole>().unwrap_or(UserRole::Student),
            status: self
                .status
                .parse::<UserStatus>()
                .unwrap_or(UserStatus::Active),
            profile: UserProfile {
                display_name: self.display_name,
                student_number: self.student_number,
                course: self.course,
                section_id: self.section_id,
                institute: self.institute,
                is_irregular: self.is_irregular,
            },
            section_code: section.map(|s| s.code),
            failure: FailureTracking {
                failure_count: self.evaluation_failure_count,
                last_failure_date: self.last_evaluation_failure_date.map(from_timestamp),
                alert_sent: self.failure_alert_sent,
            },
            last_login: self.last_login.map(from_timestamp),
            created_at: from_timestamp(self.created_at),
            updated_at: from_timestamp(self.updated_at),
        }
    }
}
