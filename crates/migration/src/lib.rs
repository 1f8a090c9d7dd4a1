pub use sea_orm_migration::prelude::*;

mod m20250901_create_catalogue_tables;
mod m20250902_add_indexes;
mod m20250903_add_search_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_create_catalogue_tables::Migration),
            Box::new(m20250902_add_indexes::Migration),
            Box::new(m20250903_add_search_indexes::Migration),
        ]
    }
}
