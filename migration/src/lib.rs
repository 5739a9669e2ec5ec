pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_accounts;
mod m20250302_000001_create_evaluations;
mod m20250303_000001_create_results;
mod m20250304_000001_create_system_settings;
mod m20250305_000001_create_admin_activity_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_accounts::Migration),
            Box::new(m20250302_000001_create_evaluations::Migration),
            Box::new(m20250303_000001_create_results::Migration),
            Box::new(m20250304_000001_create_system_settings::Migration),
            Box::new(m20250305_000001_create_admin_activity_logs::Migration),
        ]
    }
}
