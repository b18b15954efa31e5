use async_trait::async_trait;
use log::{debug, info, warn};
use std::sync::Arc;

use super::mapping::{to_teller_account, to_transaction};
use super::models::TellerLinkSummary;
use super::traits::{TellerApiClient, TellerSyncServiceTrait};
use watson_core::accounts::{InstitutionRepositoryTrait, TellerAccountRepositoryTrait};
use watson_core::errors::Result;
use watson_core::jobs::{FetchTransactionsPayload, JobEnqueuer, JobType};
use watson_core::transactions::{Transaction, TransactionRepositoryTrait};

/// Syncs Teller enrollments: accounts on link, then transactions per account.
pub struct TellerSyncService {
    client: Arc<dyn TellerApiClient>,
    institution_repository: Arc<dyn InstitutionRepositoryTrait>,
    account_repository: Arc<dyn TellerAccountRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    enqueuer: JobEnqueuer,
}

impl TellerSyncService {
    pub fn new(
        client: Arc<dyn TellerApiClient>,
        institution_repository: Arc<dyn InstitutionRepositoryTrait>,
        account_repository: Arc<dyn TellerAccountRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        enqueuer: JobEnqueuer,
    ) -> Self {
        Self {
            client,
            institution_repository,
            account_repository,
            transaction_repository,
            enqueuer,
        }
    }
}

#[async_trait]
impl TellerSyncServiceTrait for TellerSyncService {
    async fn handle_new_link(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<TellerLinkSummary> {
        let accounts = self.client.list_accounts(access_token).await?;
        let mut summary = TellerLinkSummary {
            accounts_seen: accounts.len(),
            ..Default::default()
        };
        info!(
            "Teller returned {} accounts for user {}",
            accounts.len(),
            user_id
        );

        for api_account in accounts {
            let account_id = api_account.id.clone();

            let institution = match self
                .institution_repository
                .find_by_access_token(user_id, access_token)
            {
                Ok(Some(institution)) => institution,
                Ok(None) => {
                    warn!(
                        "No Teller institution for user {} and this access token; skipping account {}",
                        user_id, account_id
                    );
                    continue;
                }
                Err(e) => {
                    warn!(
                        "Institution lookup failed for account {}: {}; skipping",
                        account_id, e
                    );
                    continue;
                }
            };

            let account = to_teller_account(api_account, user_id, &institution.id);
            let saved = match self.account_repository.upsert(account).await {
                Ok(saved) => saved,
                Err(e) => {
                    warn!("Failed to save Teller account {}: {}; skipping", account_id, e);
                    continue;
                }
            };
            summary.accounts_saved += 1;

            let Some(transactions_link) = saved.transactions_link.clone() else {
                warn!("Teller account {} has no transactions link", saved.id);
                continue;
            };
            let payload = FetchTransactionsPayload {
                account_id: saved.id.clone(),
                user_id: user_id.to_string(),
                institution_id: institution.id.clone(),
                access_token: access_token.to_string(),
                transactions_link,
            };
            match self
                .enqueuer
                .enqueue(JobType::FetchTransactions, &payload)
                .await
            {
                Ok(job_id) => {
                    debug!("Enqueued {} for account {}", job_id, saved.id);
                    summary.jobs_enqueued += 1;
                }
                Err(e) => warn!(
                    "Failed to enqueue transaction fetch for account {}: {}",
                    saved.id, e
                ),
            }
        }

        info!(
            "Teller link for user {}: {} saved, {} fetch jobs enqueued",
            user_id, summary.accounts_saved, summary.jobs_enqueued
        );
        Ok(summary)
    }

    async fn fetch_transactions(&self, request: &FetchTransactionsPayload) -> Result<usize> {
        let api_transactions = self
            .client
            .list_transactions(&request.transactions_link, &request.access_token)
            .await?;

        // Map everything first: one bad row rejects the batch before any write.
        let transactions = api_transactions
            .into_iter()
            .map(|t| to_transaction(t, &request.user_id, &request.institution_id))
            .collect::<Result<Vec<Transaction>>>()?;

        let written = self
            .transaction_repository
            .upsert_many(transactions)
            .await?;
        info!(
            "Stored {} Teller transactions for account {}",
            written, request.account_id
        );
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::teller::models::{
        TellerAccountLinks, TellerApiAccount, TellerApiInstitution, TellerApiTransaction,
    };
    use chrono::NaiveDateTime;
    use std::sync::Mutex;
    use watson_core::accounts::{Institution, NewInstitution, TellerAccount};
    use watson_core::errors::DatabaseError;
    use watson_core::jobs::{InMemoryJobQueue, JobQueueTrait};
    use watson_core::{Error, MonthYear};

    struct MockTellerClient {
        accounts: Vec<TellerApiAccount>,
        transactions: Vec<TellerApiTransaction>,
        requested_links: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TellerApiClient for MockTellerClient {
        async fn list_accounts(&self, _access_token: &str) -> Result<Vec<TellerApiAccount>> {
            Ok(self.accounts.clone())
        }

        async fn list_transactions(
            &self,
            transactions_link: &str,
            _access_token: &str,
        ) -> Result<Vec<TellerApiTransaction>> {
            self.requested_links
                .lock()
                .unwrap()
                .push(transactions_link.to_string());
            Ok(self.transactions.clone())
        }
    }

    struct MockInstitutionRepository {
        institution: Option<Institution>,
    }

    #[async_trait]
    impl InstitutionRepositoryTrait for MockInstitutionRepository {
        fn find_by_access_token(
            &self,
            user_id: &str,
            access_token: &str,
        ) -> Result<Option<Institution>> {
            Ok(self
                .institution
                .clone()
                .filter(|i| i.user_id == user_id && i.access_token == access_token))
        }

        async fn create(&self, _new_institution: NewInstitution) -> Result<Institution> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct MockAccountRepository {
        saved: Mutex<Vec<TellerAccount>>,
        fail_for: Option<String>,
    }

    #[async_trait]
    impl TellerAccountRepositoryTrait for MockAccountRepository {
        fn get_by_id(&self, account_id: &str) -> Result<Option<TellerAccount>> {
            Ok(self
                .saved
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == account_id)
                .cloned())
        }

        fn list_by_user(&self, user_id: &str) -> Result<Vec<TellerAccount>> {
            Ok(self
                .saved
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect())
        }

        async fn upsert(&self, account: TellerAccount) -> Result<TellerAccount> {
            if self.fail_for.as_deref() == Some(account.id.as_str()) {
                return Err(DatabaseError::QueryFailed("disk full".to_string()).into());
            }
            self.saved.lock().unwrap().push(account.clone());
            Ok(account)
        }
    }

    #[derive(Default)]
    struct MockTransactionRepository {
        batches: Mutex<Vec<Vec<Transaction>>>,
    }

    #[async_trait]
    impl TransactionRepositoryTrait for MockTransactionRepository {
        async fn upsert_many(&self, transactions: Vec<Transaction>) -> Result<usize> {
            let n = transactions.len();
            self.batches.lock().unwrap().push(transactions);
            Ok(n)
        }

        fn list_for_month(&self, _user_id: &str, _month: MonthYear) -> Result<Vec<Transaction>> {
            Ok(vec![])
        }

        fn sum_for_category(&self, _: &str, _: MonthYear, _: &str) -> Result<f64> {
            Ok(0.0)
        }

        fn sum_excluding_categories(&self, _: &str, _: MonthYear, _: &[String]) -> Result<f64> {
            Ok(0.0)
        }
    }

    fn institution() -> Institution {
        let ts = NaiveDateTime::default();
        Institution {
            id: "inst_1".to_string(),
            user_id: "42".to_string(),
            name: "Chase".to_string(),
            teller_id: "enr_1".to_string(),
            access_token: "token_abc".to_string(),
            created_at: ts,
            updated_at: ts,
        }
    }

    fn api_account(id: &str) -> TellerApiAccount {
        TellerApiAccount {
            id: id.to_string(),
            enrollment_id: Some("enr_1".to_string()),
            name: format!("Account {id}"),
            account_type: "depository".to_string(),
            subtype: Some("checking".to_string()),
            currency: Some("USD".to_string()),
            last_four: Some("0001".to_string()),
            status: Some("open".to_string()),
            institution: Some(TellerApiInstitution {
                id: "chase".to_string(),
                name: Some("Chase".to_string()),
            }),
            links: TellerAccountLinks {
                self_link: Some(format!("https://api.teller.io/accounts/{id}")),
                details: None,
                balances: None,
                transactions: Some(format!("https://api.teller.io/accounts/{id}/transactions")),
            },
        }
    }

    fn api_transaction(id: &str, amount: &str) -> TellerApiTransaction {
        TellerApiTransaction {
            id: id.to_string(),
            account_id: "acc_1".to_string(),
            amount: amount.to_string(),
            description: "Grocer".to_string(),
            date: "2024-03-02".to_string(),
            transaction_type: Some("card_payment".to_string()),
            status: "posted".to_string(),
            running_balance: Some("100.00".to_string()),
            details: None,
            links: None,
        }
    }

    struct Fixture {
        service: TellerSyncService,
        queue: Arc<InMemoryJobQueue>,
        accounts: Arc<MockAccountRepository>,
        transactions: Arc<MockTransactionRepository>,
    }

    fn fixture(
        client: MockTellerClient,
        institution: Option<Institution>,
        accounts: MockAccountRepository,
    ) -> Fixture {
        let queue = Arc::new(InMemoryJobQueue::new());
        let accounts = Arc::new(accounts);
        let transactions = Arc::new(MockTransactionRepository::default());
        let service = TellerSyncService::new(
            Arc::new(client),
            Arc::new(MockInstitutionRepository { institution }),
            accounts.clone(),
            transactions.clone(),
            JobEnqueuer::new(queue.clone() as Arc<dyn JobQueueTrait>),
        );
        Fixture {
            service,
            queue,
            accounts,
            transactions,
        }
    }

    fn client(accounts: Vec<TellerApiAccount>, transactions: Vec<TellerApiTransaction>) -> MockTellerClient {
        MockTellerClient {
            accounts,
            transactions,
            requested_links: Mutex::new(vec![]),
        }
    }

    #[tokio::test]
    async fn new_link_fans_out_one_fetch_per_account() {
        let f = fixture(
            client(vec![api_account("acc_1"), api_account("acc_2")], vec![]),
            Some(institution()),
            MockAccountRepository::default(),
        );

        let summary = f.service.handle_new_link("42", "token_abc").await.unwrap();
        assert_eq!(summary.accounts_seen, 2);
        assert_eq!(summary.accounts_saved, 2);
        assert_eq!(summary.jobs_enqueued, 2);
        assert_eq!(f.accounts.list_by_user("42").unwrap().len(), 2);

        let jobs = f.queue.snapshot();
        assert_eq!(jobs.len(), 2);
        let mut links: Vec<String> = jobs
            .iter()
            .map(|job| {
                assert_eq!(job.kind().unwrap(), JobType::FetchTransactions);
                let payload: FetchTransactionsPayload = job.payload().unwrap();
                assert_eq!(payload.institution_id, "inst_1");
                assert_eq!(payload.access_token, "token_abc");
                assert!(payload.transactions_link.contains(&payload.account_id));
                payload.transactions_link
            })
            .collect();
        links.sort();
        assert_eq!(
            links,
            vec![
                "https://api.teller.io/accounts/acc_1/transactions".to_string(),
                "https://api.teller.io/accounts/acc_2/transactions".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn failed_account_save_is_skipped() {
        let f = fixture(
            client(vec![api_account("acc_1"), api_account("acc_2")], vec![]),
            Some(institution()),
            MockAccountRepository {
                fail_for: Some("acc_1".to_string()),
                ..Default::default()
            },
        );

        let summary = f.service.handle_new_link("42", "token_abc").await.unwrap();
        assert_eq!(summary.accounts_saved, 1);
        assert_eq!(summary.jobs_enqueued, 1);
        let payload: FetchTransactionsPayload = f.queue.snapshot()[0].payload().unwrap();
        assert_eq!(payload.account_id, "acc_2");
    }

    #[tokio::test]
    async fn unknown_institution_saves_nothing() {
        let f = fixture(
            client(vec![api_account("acc_1")], vec![]),
            None,
            MockAccountRepository::default(),
        );

        let summary = f.service.handle_new_link("42", "token_abc").await.unwrap();
        assert_eq!(summary.accounts_seen, 1);
        assert_eq!(summary.accounts_saved, 0);
        assert!(f.queue.is_empty());
    }

    fn fetch_request() -> FetchTransactionsPayload {
        FetchTransactionsPayload {
            account_id: "acc_1".to_string(),
            user_id: "42".to_string(),
            institution_id: "inst_1".to_string(),
            access_token: "token_abc".to_string(),
            transactions_link: "https://api.teller.io/accounts/acc_1/transactions".to_string(),
        }
    }

    #[tokio::test]
    async fn fetch_transactions_stores_one_batch() {
        let f = fixture(
            client(
                vec![],
                vec![api_transaction("t1", "-12.50"), api_transaction("t2", "40")],
            ),
            Some(institution()),
            MockAccountRepository::default(),
        );

        let written = f.service.fetch_transactions(&fetch_request()).await.unwrap();
        assert_eq!(written, 2);
        let batches = f.transactions.batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0][0].amount, -12.5);
        assert_eq!(batches[0][0].running_balance, Some(100.0));
    }

    #[tokio::test]
    async fn bad_amount_rejects_the_batch_before_writing() {
        let f = fixture(
            client(
                vec![],
                vec![api_transaction("t1", "-12.50"), api_transaction("t2", "n/a")],
            ),
            Some(institution()),
            MockAccountRepository::default(),
        );

        let err = f.service.fetch_transactions(&fetch_request()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(f.transactions.batches.lock().unwrap().is_empty());
    }
}
