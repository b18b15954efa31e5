//! Traits at the Plaid seams: the HTTP API and the sync service.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::models::{PlaidApiAccount, PlaidSyncSummary, PlaidTokenExchange, PlaidTransactionsPage};
use watson_core::accounts::PlaidToken;
use watson_core::errors::Result;
use watson_core::jobs::{FetchPlaidTransactionsPayload, InitialPlaidSyncPayload};

/// Trait for calling the Plaid API
#[async_trait]
pub trait PlaidApiClient: Send + Sync {
    /// Create a Link token for the user's client-side Link flow
    async fn create_link_token(&self, user_id: &str) -> Result<String>;

    /// Exchange a Link public token for a long-lived access token
    async fn exchange_public_token(&self, public_token: &str) -> Result<PlaidTokenExchange>;

    async fn get_accounts(&self, access_token: &str) -> Result<Vec<PlaidApiAccount>>;

    /// Fetch one page of an account's transactions between two dates, inclusive
    async fn get_transactions(
        &self,
        access_token: &str,
        account_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        count: usize,
        offset: usize,
    ) -> Result<PlaidTransactionsPage>;
}

/// Trait for the Plaid sync service operations
#[async_trait]
pub trait PlaidSyncServiceTrait: Send + Sync {
    async fn create_link_token(&self, user_id: &str) -> Result<String>;

    /// Exchanges a public token and records the item, pending its initial sync.
    async fn link_public_token(&self, user_id: &str, public_token: &str) -> Result<PlaidToken>;

    /// First sync of an item: stores its accounts and enqueues a fetch per account.
    async fn initial_sync(&self, request: &InitialPlaidSyncPayload) -> Result<PlaidSyncSummary>;

    /// Enqueues a transaction fetch for every stored account of the user.
    async fn sync_accounts(&self, user_id: &str) -> Result<usize>;

    /// Fetches and stores one account's transactions for a month, then marks it synced.
    async fn fetch_transactions(&self, request: &FetchPlaidTransactionsPayload) -> Result<usize>;
}
