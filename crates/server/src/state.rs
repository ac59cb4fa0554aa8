//! Application state shared across handlers.

use sqlx::SqlitePool;

use crate::db::UserRepository;

/// Application state shared across all handlers.
///
/// The explicit store handle every operation receives. Cloning is cheap;
/// the pool is reference-counted internally.
#[derive(Clone, Debug)]
pub struct AppState {
    pool: SqlitePool,
}

impl AppState {
    /// Create a new application state around an open pool.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Repository for the `users` table.
    #[must_use]
    pub const fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }
}
