//! Nexus DB - Database abstractions
//!
//! SQLx-based account and subscription history storage, plus an in-memory
//! backend with the same uniqueness guarantees.
//!
//! # Example
//!
//! ```rust,ignore
//! use nexus_db::{create_pool, run_migrations, Repositories};
//!
//! let pool = create_pool("postgres://localhost/nexus").await?;
//! run_migrations(&pool).await?;
//! let repos = Repositories::new(pool);
//!
//! let account = repos.accounts.find_by_referral_code("NEXUS-7K2Q9Z").await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod pg;
pub mod pool;
pub mod repo;

pub use error::{DbError, DbResult};
pub use memory::{InMemoryAccountRepository, InMemoryHistoryRepository};
pub use models::*;
pub use pg::Repositories;
pub use pool::{create_pool, run_migrations, DbPool};
pub use repo::*;
