pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_marketplace_tables;
mod m20250601_000002_create_legal_analysis_tables;
mod m20250601_000003_create_ai_insight_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_marketplace_tables::Migration),
            Box::new(m20250601_000002_create_legal_analysis_tables::Migration),
            Box::new(m20250601_000003_create_ai_insight_tables::Migration),
        ]
    }
}
