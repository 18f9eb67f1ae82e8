//! # temple-db
//!
//! Storage layer implementing the temple-core repository traits.
//!
//! ## Overview
//!
//! - PostgreSQL repositories via SQLx (runtime-checked queries, `FromRow` models)
//! - Entity ↔ model mappers
//! - Connection pool management and SQL migrations
//! - In-memory repositories for the `memory` backend and tests
//!
//! ## Usage
//!
//! ```rust,ignore
//! use temple_db::pool::{create_pool, run_migrations, PoolConfig};
//! use temple_db::repositories::PgEventRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&PoolConfig::new("postgres://localhost/temple")).await?;
//!     run_migrations(&pool).await?;
//!     let events = PgEventRepository::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::{
    MemoryCheckInRepository, MemoryEventRepository, MemoryHealthProbe,
    MemoryRegistrationRepository,
};
pub use pool::{create_pool, run_migrations, PgPool, PoolConfig};
pub use repositories::{
    PgCheckInRepository, PgEventRepository, PgHealthProbe, PgRegistrationRepository,
};
