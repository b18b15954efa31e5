//! Transactions module - normalized aggregator transactions.

mod transactions_model;
mod transactions_traits;

pub use transactions_model::{Transaction, TransactionProvider, TransactionStatus};
pub use transactions_traits::TransactionRepositoryTrait;
