use async_trait::async_trait;
use rent_core::db::{StoreConfig, StoreFactory};
use rent_core::{KeyValueStore, StoreError};
use tracing::debug;

use crate::repository::SqliteKeyValueStore;

/// Turns a connection string from the config file into a sqlx URL.
///
/// * `":memory:"` becomes an ephemeral in-memory database.
/// * A value already starting with `sqlite:` is passed through.
/// * Anything else is a file path, created if it does not exist.
pub fn database_url(connection_string: &str) -> String {
    let trimmed = connection_string.trim();
    if trimmed == ":memory:" {
        "sqlite::memory:".to_string()
    } else if trimmed.starts_with("sqlite:") {
        trimmed.to_string()
    } else {
        format!("sqlite:{trimmed}?mode=rwc")
    }
}

/// [`StoreFactory`] for SQLite.
///
/// Register this with a [`rent_core::db::StoreRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use rent_core::db::StoreRegistry;
/// use rent_db_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::new();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database and brings its schema up to date.
    async fn create(&self, config: &StoreConfig) -> Result<Box<dyn KeyValueStore>, StoreError> {
        let url = database_url(&config.connection_string);
        debug!(%url, "opening sqlite store");

        let store = SqliteKeyValueStore::new(&url)
            .await
            .map_err(|e| StoreError::Connection(format!("{e:#}")))?;
        store
            .run_migrations()
            .await
            .map_err(|e| StoreError::Database(format!("{e:#}")))?;
        Ok(Box::new(store))
    }
}
