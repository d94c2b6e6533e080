//! Common test utilities for nexus-entitlement-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::{
    account_row, FlakyAccountRepository, FlakyHistoryRepository, RacingAccountRepository,
    StuckLapsedRepository, TakenCodesRepository,
};
