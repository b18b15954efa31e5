//! SQLite storage implementation for the Watson worker.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `watson-core` and contains:
//! - Database connection pooling and the single-writer actor
//! - Diesel migrations
//! - Repository implementations for linked accounts, transactions and budgets
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the workspace where Diesel dependencies exist.
//! `core` and `connect` work against the repository traits.
//!
//! ```text
//! core (domain)          connect (aggregators)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod budget;
pub mod institutions;
pub mod plaid;
pub mod teller_accounts;
pub mod transactions;

#[cfg(test)]
mod test_support;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use budget::BudgetRepository;
pub use institutions::InstitutionRepository;
pub use plaid::{PlaidAccountRepository, PlaidTokenRepository};
pub use teller_accounts::TellerAccountRepository;
pub use transactions::TransactionRepository;

// Re-export from watson-core for convenience
pub use watson_core::errors::{DatabaseError, Error, Result};
