//! # Scolaris DB
//!
//! Database connection pool initialization for the Scolaris API,
//! backed by SQLx with PostgreSQL.

use std::env;

/// Initializes a PostgreSQL connection pool from the `DATABASE_URL`
/// environment variable.
///
/// The returned [`PgPool`] is cheaply cloneable and should be created once
/// at startup, then shared through the application state.
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the connection fails; there is no
/// useful way to continue without a database.
pub async fn init_db_pool() -> sqlx::PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;
