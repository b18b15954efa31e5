//! Traits at the Teller seams: the HTTP API and the sync service.

use async_trait::async_trait;

use super::models::{TellerApiAccount, TellerApiTransaction, TellerLinkSummary};
use watson_core::errors::Result;
use watson_core::jobs::FetchTransactionsPayload;

/// Trait for fetching data from the Teller API
#[async_trait]
pub trait TellerApiClient: Send + Sync {
    /// List every account of the enrollment behind `access_token`
    async fn list_accounts(&self, access_token: &str) -> Result<Vec<TellerApiAccount>>;

    /// Fetch transactions from an account's own transactions link
    async fn list_transactions(
        &self,
        transactions_link: &str,
        access_token: &str,
    ) -> Result<Vec<TellerApiTransaction>>;
}

/// Trait for the Teller sync service operations
#[async_trait]
pub trait TellerSyncServiceTrait: Send + Sync {
    /// Stores the enrollment's accounts and enqueues one transaction fetch per saved account.
    async fn handle_new_link(&self, user_id: &str, access_token: &str)
        -> Result<TellerLinkSummary>;

    /// Fetches and stores one account's transactions atomically. Returns the row count.
    async fn fetch_transactions(&self, request: &FetchTransactionsPayload) -> Result<usize>;
}
