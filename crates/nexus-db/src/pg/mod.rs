//! PostgreSQL repository implementations

mod account;
mod history;

pub use account::PgAccountRepository;
pub use history::PgHistoryRepository;

use crate::DbPool;

/// All repositories bundled together
#[derive(Clone)]
pub struct Repositories {
    pub accounts: PgAccountRepository,
    pub history: PgHistoryRepository,
}

impl Repositories {
    /// Create all repositories from a database pool
    pub fn new(pool: DbPool) -> Self {
        Self {
            accounts: PgAccountRepository::new(pool.clone()),
            history: PgHistoryRepository::new(pool),
        }
    }
}
