//! Plaid integration: item linking, account sync and monthly transaction pulls.

mod client;
mod mapping;
mod models;
mod service;
mod traits;


pub use client::{PlaidClient, PlaidEnvironment};
pub use mapping::{normalize_category, to_plaid_account, to_transaction};
pub use models::{
    PlaidApiAccount, PlaidApiTransaction, PlaidBalances, PlaidPersonalFinanceCategory,
    PlaidSyncSummary, PlaidTokenExchange, PlaidTransactionsPage,
};
pub use service::{PlaidSyncService, TRANSACTIONS_PAGE_SIZE};
pub use traits::{PlaidApiClient, PlaidSyncServiceTrait};
