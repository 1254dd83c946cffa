pub use sea_orm_migration::prelude::*;

mod m20241129_000000_create_users;
mod m20241129_000001_create_password_resets;
mod m20241130_000000_create_products;
mod m20241201_000000_seed_products;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241129_000000_create_users::Migration),
            Box::new(m20241129_000001_create_password_resets::Migration),
            Box::new(m20241130_000000_create_products::Migration),
            Box::new(m20241201_000000_seed_products::Migration),
        ]
    }
}
