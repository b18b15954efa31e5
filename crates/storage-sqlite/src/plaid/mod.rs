//! SQLite storage for Plaid items (access tokens) and their accounts.

mod model;
mod repository;

pub use model::{PlaidAccountDB, PlaidTokenDB};
pub use repository::{PlaidAccountRepository, PlaidTokenRepository};
