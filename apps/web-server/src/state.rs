//! Application state - shared across all handlers.

use std::sync::Arc;

use thiserror::Error;

use yatube_core::Paginator;
use yatube_core::ports::{
    GroupRepository, PasswordService, PostRepository, TokenService, UserRepository,
};
use yatube_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub paginator: Paginator,
}

/// Failure to bring up the configured backing store.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Database connection failed: {0}")]
    Database(String),

    #[error("Database migration failed: {0}")]
    Migration(String),
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// Without `DATABASE_URL` everything lives in an [`InMemoryStore`].
    pub async fn new(config: &AppConfig) -> Result<Self, StateError> {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let paginator = Paginator::new(config.posts_per_page);

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            use migration::MigratorTrait;
            use yatube_infra::database::{
                PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository, connect,
            };

            let conn = Arc::new(
                connect(db_config)
                    .await
                    .map_err(|e| StateError::Database(e.to_string()))?,
            );

            if db_config.auto_migrate {
                tracing::info!("Applying pending migrations");
                migration::Migrator::up(conn.as_ref(), None)
                    .await
                    .map_err(|e| StateError::Migration(e.to_string()))?;
            }

            tracing::info!("Application state initialized (postgres)");
            return Ok(Self {
                users: Arc::new(PostgresUserRepository::new(conn.clone())),
                groups: Arc::new(PostgresGroupRepository::new(conn.clone())),
                posts: Arc::new(PostgresPostRepository::new(conn)),
                tokens,
                passwords,
                paginator,
            });
        }

        #[cfg(not(feature = "postgres"))]
        if config.database.is_some() {
            tracing::warn!("DATABASE_URL ignored - built without the postgres feature");
        }

        tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
        Ok(Self::in_memory(
            Arc::new(InMemoryStore::new()),
            tokens,
            passwords,
            paginator,
        ))
    }

    /// State backed by a single in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryStore>,
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        paginator: Paginator,
    ) -> Self {
        Self {
            users: store.clone(),
            groups: store.clone(),
            posts: store,
            tokens,
            passwords,
            paginator,
        }
    }
}
