//! 管理员操作日志实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_activity_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub admin_id: Option<i64>,
    pub action: String,
    pub target_user_id: Option<i64>,
    pub target_section_id: Option<i64>,
    pub description: String,
    pub ip_address: Option<String>,
    pub timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_activity_log(self) -> crate::models::activity_logs::entities::AdminActivityLog {
        use crate::models::activity_logs::entities::{ActivityAction, AdminActivityLog};

        AdminActivityLog {
            id: self.id,
            admin_id: self.admin_id,
            action: self
                .action
                .parse::<ActivityAction>()
                .unwrap_or(ActivityAction::UpdateSetting),
            target_user_id: self.target_user_id,
            target_section_id: self.target_section_id,
            description: self.description,
            ip_address: self.ip_address,
            timestamp: super::from_timestamp(self.timestamp),
        }
    }
}
