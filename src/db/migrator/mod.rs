use sea_orm_migration::prelude::*;

mod m20240101_initial;
mod m20240322_add_now_watching;
mod m20240510_add_episode_progress;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_initial::Migration),
            Box::new(m20240322_add_now_watching::Migration),
            Box::new(m20240510_add_episode_progress::Migration),
        ]
    }
}
