//! # rankup-db
//!
//! Database layer implementing the ledger, blacklist and reset schedule ports
//! with PostgreSQL via SQLx.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rankup_db::{create_pool, run_migrations, PgLedgerRepository, PoolConfig};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::default()).await?;
//!     run_migrations(&pool, None).await?;
//!     let ledger = PgLedgerRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig, DEFAULT_MIGRATIONS_DIR};
pub use repositories::{PgBlacklistRepository, PgLedgerRepository, PgResetScheduleRepository};
