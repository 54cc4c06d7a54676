//! Database connection pool management

mod migrate;
mod postgres;

pub use migrate::{run_migrations, DEFAULT_MIGRATIONS_DIR};
pub use postgres::{create_pool, PoolConfig};

// Re-export PgPool for convenience
pub use sqlx::postgres::PgPool;
