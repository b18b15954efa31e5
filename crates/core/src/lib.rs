//! Watson Core - job processing, domain entities, services, and traits.
//!
//! This crate holds the queue contract and worker pool, the models and
//! repository traits for linked accounts, transactions and budgets, and the
//! daily allowance engine. It is database-agnostic; `storage-sqlite`
//! implements the repository traits and `queue-redis` the durable queue.

pub mod accounts;
pub mod budget;
pub mod constants;
pub mod errors;
pub mod jobs;
pub mod transactions;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;

pub use utils::time_utils::MonthYear;
