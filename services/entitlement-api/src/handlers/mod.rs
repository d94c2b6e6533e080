//! REST API handlers

pub mod accounts;
pub mod expiry;
pub mod health;
pub mod shared;

pub use accounts::*;
pub use expiry::*;
pub use health::*;
