use sea_orm_migration::prelude::*;

mod m20260301_000001_create_events;
mod m20260301_000002_add_events_user_date_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_events::Migration),
            Box::new(m20260301_000002_add_events_user_date_index::Migration),
        ]
    }
}
