//! Schema migrations for the Yatube database.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;
mod m20240101_000002_create_groups_table;
mod m20240101_000003_create_posts_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_groups_table::Migration),
            Box::new(m20240101_000003_create_posts_table::Migration),
        ]
    }
}

#[cfg(test)]
mod tests {
    use sea_orm_migration::sea_orm::{ConnectOptions, Database, DbErr};

    use super::*;

    #[tokio::test]
    async fn test_migrations_okay() -> Result<(), DbErr> {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).min_connections(1);
        let db = Database::connect(opts).await?;
        let schema_manager = SchemaManager::new(&db);

        Migrator::up(&db, None).await?;

        assert!(schema_manager.has_table("users").await?);
        assert!(schema_manager.has_table("groups").await?);
        assert!(schema_manager.has_table("posts").await?);

        Migrator::down(&db, None).await?;
        assert!(!schema_manager.has_table("posts").await?);

        Ok(())
    }
}
