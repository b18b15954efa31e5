use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

use super::mapping::{to_plaid_account, to_transaction};
use super::models::{PlaidApiTransaction, PlaidSyncSummary};
use super::traits::{PlaidApiClient, PlaidSyncServiceTrait};
use watson_core::accounts::{
    NewPlaidToken, PlaidAccount, PlaidAccountRepositoryTrait, PlaidToken,
    PlaidTokenRepositoryTrait,
};
use watson_core::errors::{DatabaseError, JobError, Result};
use watson_core::jobs::{
    FetchPlaidTransactionsPayload, InitialPlaidSyncPayload, JobEnqueuer, JobType,
};
use watson_core::transactions::{Transaction, TransactionRepositoryTrait};
use watson_core::MonthYear;

/// Page size for `/transactions/get`.
pub const TRANSACTIONS_PAGE_SIZE: usize = 500;

/// Syncs Plaid items: accounts on the first sync, then transactions per account and month.
pub struct PlaidSyncService {
    client: Arc<dyn PlaidApiClient>,
    token_repository: Arc<dyn PlaidTokenRepositoryTrait>,
    account_repository: Arc<dyn PlaidAccountRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    enqueuer: JobEnqueuer,
    page_size: usize,
}

impl PlaidSyncService {
    pub fn new(
        client: Arc<dyn PlaidApiClient>,
        token_repository: Arc<dyn PlaidTokenRepositoryTrait>,
        account_repository: Arc<dyn PlaidAccountRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        enqueuer: JobEnqueuer,
    ) -> Self {
        Self {
            client,
            token_repository,
            account_repository,
            transaction_repository,
            enqueuer,
            page_size: TRANSACTIONS_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    async fn enqueue_fetch(&self, account_id: &str, user_id: &str) -> bool {
        let payload = FetchPlaidTransactionsPayload {
            account_id: account_id.to_string(),
            user_id: user_id.to_string(),
            month_year: None,
        };
        match self
            .enqueuer
            .enqueue(JobType::FetchPlaidTransactions, &payload)
            .await
        {
            Ok(job_id) => {
                debug!("Enqueued {} for Plaid account {}", job_id, account_id);
                true
            }
            Err(e) => {
                warn!(
                    "Failed to enqueue transaction fetch for Plaid account {}: {}",
                    account_id, e
                );
                false
            }
        }
    }

    /// Collects every page until Plaid's reported total is reached.
    async fn fetch_all_pages(
        &self,
        access_token: &str,
        account_id: &str,
        month: MonthYear,
    ) -> Result<Vec<PlaidApiTransaction>> {
        let mut collected: Vec<PlaidApiTransaction> = Vec::new();
        loop {
            let page = self
                .client
                .get_transactions(
                    access_token,
                    account_id,
                    month.first_day(),
                    month.last_day(),
                    self.page_size,
                    collected.len(),
                )
                .await?;
            let received = page.transactions.len();
            collected.extend(page.transactions);
            debug!(
                "Plaid page for {}: {} rows ({}/{})",
                account_id,
                received,
                collected.len(),
                page.total_transactions
            );
            if received == 0 || collected.len() >= page.total_transactions {
                break;
            }
        }
        Ok(collected)
    }
}

#[async_trait]
impl PlaidSyncServiceTrait for PlaidSyncService {
    async fn create_link_token(&self, user_id: &str) -> Result<String> {
        self.client.create_link_token(user_id).await
    }

    async fn link_public_token(&self, user_id: &str, public_token: &str) -> Result<PlaidToken> {
        let exchange = self.client.exchange_public_token(public_token).await?;
        let token = self
            .token_repository
            .create(NewPlaidToken {
                user_id: user_id.to_string(),
                access_token: exchange.access_token,
                item_id: exchange.item_id,
            })
            .await?;
        info!("Recorded Plaid item {} for user {}", token.item_id, user_id);
        Ok(token)
    }

    async fn initial_sync(&self, request: &InitialPlaidSyncPayload) -> Result<PlaidSyncSummary> {
        let token = self
            .token_repository
            .get_by_access_token(&request.access_token)?
            .ok_or_else(|| DatabaseError::NotFound("Plaid access token".to_string()))?;
        if token.is_processed {
            return Err(JobError::TokenAlreadyProcessed(token.id).into());
        }
        if let Some(requested) = request.user_id.as_deref() {
            if requested != token.user_id {
                return Err(JobError::UserMismatch {
                    requested: requested.to_string(),
                    owner: token.user_id,
                }
                .into());
            }
        }

        let api_accounts = self.client.get_accounts(&request.access_token).await?;

        self.token_repository.mark_processed(&token.id).await?;

        let accounts: Vec<PlaidAccount> = api_accounts
            .into_iter()
            .map(|a| to_plaid_account(a, &token.user_id, &token.id))
            .collect();
        let account_ids: Vec<String> = accounts.iter().map(|a| a.id.clone()).collect();
        let saved = self.account_repository.upsert_many(accounts).await?;

        let mut summary = PlaidSyncSummary {
            accounts_saved: saved,
            jobs_enqueued: 0,
        };
        for account_id in &account_ids {
            if self.enqueue_fetch(account_id, &token.user_id).await {
                summary.jobs_enqueued += 1;
            }
        }

        info!(
            "Initial Plaid sync for user {}: {} accounts, {} fetch jobs enqueued",
            token.user_id, summary.accounts_saved, summary.jobs_enqueued
        );
        Ok(summary)
    }

    async fn sync_accounts(&self, user_id: &str) -> Result<usize> {
        let account_ids = self.account_repository.list_ids_by_user(user_id)?;
        let mut enqueued = 0;
        for account_id in &account_ids {
            if self.enqueue_fetch(account_id, user_id).await {
                enqueued += 1;
            }
        }
        info!(
            "Enqueued {} of {} Plaid account fetches for user {}",
            enqueued,
            account_ids.len(),
            user_id
        );
        Ok(enqueued)
    }

    async fn fetch_transactions(&self, request: &FetchPlaidTransactionsPayload) -> Result<usize> {
        let access_token = self
            .account_repository
            .get_access_token(&request.account_id, &request.user_id)?
            .ok_or_else(|| {
                DatabaseError::NotFound(format!(
                    "Plaid account {} for user {}",
                    request.account_id, request.user_id
                ))
            })?;
        let month = request.month_year.unwrap_or_else(MonthYear::current);

        let api_transactions = self
            .fetch_all_pages(&access_token, &request.account_id, month)
            .await?;
        let transactions = api_transactions
            .into_iter()
            .map(|t| to_transaction(t, &request.user_id))
            .collect::<Result<Vec<Transaction>>>()?;

        let written = self
            .transaction_repository
            .upsert_many(transactions)
            .await?;
        self.account_repository
            .mark_synced(&request.account_id)
            .await?;

        info!(
            "Stored {} Plaid transactions for account {} in {}",
            written, request.account_id, month
        );
        Ok(written)
    }
}
