pub use sea_orm_migration::prelude::*;

mod m20250708_000001_create_installment_tables;
mod m20250708_000002_add_counter_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250708_000001_create_installment_tables::Migration),
            Box::new(m20250708_000002_add_counter_table::Migration),
        ]
    }
}
