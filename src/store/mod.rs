// src/store/mod.rs

//! Local persistence for subjects, questions, exam templates, results and
//! the attribute registry.
//!
//! Every collection is a table in one SQLite database. The pool is opened
//! lazily by the first operation that needs it and then reused; a failed open
//! leaves nothing cached, so the next operation simply tries again.

use std::{str::FromStr, sync::Arc};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tokio::sync::OnceCell;

use crate::{config::Config, error::AppError};

mod attributes;
mod exam_configs;
pub mod hierarchy;
mod maintenance;
mod questions;
mod results;
mod subjects;

/// Handle to the process-wide store. Cheap to clone; clones share one pool.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    database_url: String,
    max_connections: u32,
    pool: OnceCell<SqlitePool>,
}

impl Store {
    pub fn new(database_url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                database_url: database_url.into(),
                max_connections,
                pool: OnceCell::new(),
            }),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.database_url.clone(), config.db_max_connections)
    }

    /// A private in-memory database, mainly for tests.
    pub fn in_memory() -> Self {
        Self::new("sqlite::memory:", 1)
    }

    /// Returns the live pool, opening and migrating the database on first use.
    pub async fn pool(&self) -> Result<&SqlitePool, AppError> {
        self.inner
            .pool
            .get_or_try_init(|| open_pool(&self.inner.database_url, self.inner.max_connections))
            .await
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.pool.initialized()
    }
}

async fn open_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    // An in-memory database lives exactly as long as its single connection.
    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(max_connections.max(1))
    };

    let pool = pool_options.connect_with(options).await.map_err(|e| {
        tracing::error!("Failed to open store at {}: {:?}", database_url, e);
        AppError::InternalServerError(e.to_string())
    })?;

    // Forward-only, idempotent schema setup.
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Store opened and migrated: {}", database_url);

    Ok(pool)
}
