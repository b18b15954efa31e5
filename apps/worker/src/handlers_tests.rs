use super::*;
use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::sync::Mutex;
use tempfile::tempdir;

use watson_connect::{PlaidSyncSummary, TellerLinkSummary};
use watson_core::accounts::PlaidToken;
use watson_core::budget::{
    BudgetRepositoryTrait, BudgetService, DailyBalanceReport, NewMonthlyBudgetCategory,
    NewMonthlySummary,
};
use watson_core::errors::{Error, JobError};
use watson_core::MonthYear;
use watson_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, BudgetRepository, TransactionRepository,
};

#[derive(Default)]
struct RecordingTeller {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl TellerSyncServiceTrait for RecordingTeller {
    async fn handle_new_link(&self, user_id: &str, access_token: &str) -> Result<TellerLinkSummary> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("link:{}:{}", user_id, access_token));
        Ok(TellerLinkSummary::default())
    }

    async fn fetch_transactions(&self, request: &FetchTransactionsPayload) -> Result<usize> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("fetch:{}", request.account_id));
        Ok(0)
    }
}

#[derive(Default)]
struct RecordingPlaid {
    calls: Mutex<Vec<String>>,
}

#[async_trait]
impl PlaidSyncServiceTrait for RecordingPlaid {
    async fn create_link_token(&self, _user_id: &str) -> Result<String> {
        Ok("link-sandbox".to_string())
    }

    async fn link_public_token(&self, user_id: &str, _public_token: &str) -> Result<PlaidToken> {
        Ok(PlaidToken {
            id: "tok-1".to_string(),
            user_id: user_id.to_string(),
            access_token: "access-sandbox".to_string(),
            item_id: "item-1".to_string(),
            is_processed: false,
            created_at: Utc::now().naive_utc(),
        })
    }

    async fn initial_sync(&self, request: &InitialPlaidSyncPayload) -> Result<PlaidSyncSummary> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("initial:{}", request.access_token));
        Ok(PlaidSyncSummary::default())
    }

    async fn sync_accounts(&self, user_id: &str) -> Result<usize> {
        self.calls.lock().unwrap().push(format!("sync:{}", user_id));
        Ok(0)
    }

    async fn fetch_transactions(&self, request: &FetchPlaidTransactionsPayload) -> Result<usize> {
        self.calls.lock().unwrap().push(format!(
            "fetch:{}:{}",
            request.account_id,
            request.month_year.map(|m| m.code()).unwrap_or_default()
        ));
        Ok(0)
    }
}

struct UnusedBudget;

#[async_trait]
impl BudgetServiceTrait for UnusedBudget {
    async fn process_daily_balance(
        &self,
        _user_id: &str,
        _month: MonthYear,
    ) -> Result<DailyBalanceReport> {
        Err(Error::Unexpected("budget service not expected".to_string()))
    }

    async fn process_daily_balance_on(
        &self,
        _user_id: &str,
        _month: MonthYear,
        _today: NaiveDate,
    ) -> Result<DailyBalanceReport> {
        Err(Error::Unexpected("budget service not expected".to_string()))
    }
}

fn recording_services() -> (Arc<RecordingTeller>, Arc<RecordingPlaid>, WorkerServices) {
    let teller = Arc::new(RecordingTeller::default());
    let plaid = Arc::new(RecordingPlaid::default());
    let services = WorkerServices {
        teller: teller.clone(),
        plaid: plaid.clone(),
        budget: Arc::new(UnusedBudget),
    };
    (teller, plaid, services)
}

#[test]
fn registry_covers_every_job_type() {
    let (_, _, services) = recording_services();
    let registry = build_registry(&services);
    for job_type in JobType::ALL {
        assert!(registry.handles(job_type), "missing handler for {}", job_type);
    }
}

#[tokio::test]
async fn teller_jobs_reach_the_teller_service() {
    let (teller, plaid, services) = recording_services();
    let registry = build_registry(&services);

    registry
        .dispatch(&Job::new(
            "new_teller_link",
            json!({ "user_id": 7, "access_token": "token_abc" }),
        ))
        .await
        .unwrap();
    registry
        .dispatch(&Job::new(
            "fetch_transactions",
            json!({
                "account_id": "acc_1",
                "user_id": "7",
                "institution_id": "inst_1",
                "access_token": "token_abc",
                "transactions_link": "https://api.teller.io/accounts/acc_1/transactions"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(
        *teller.calls.lock().unwrap(),
        vec!["link:7:token_abc".to_string(), "fetch:acc_1".to_string()]
    );
    assert!(plaid.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn plaid_jobs_reach_the_plaid_service() {
    let (_, plaid, services) = recording_services();
    let registry = build_registry(&services);

    for job in [
        Job::new("initial_plaid_sync", json!({ "access_token": "access-1" })),
        Job::new("sync_plaid_accounts", json!({ "user_id": 3 })),
        Job::new(
            "fetch_plaid_transactions",
            json!({ "account_id": "pa_1", "user_id": "3", "month_year": 22024 }),
        ),
    ] {
        registry.dispatch(&job).await.unwrap();
    }

    assert_eq!(
        *plaid.calls.lock().unwrap(),
        vec![
            "initial:access-1".to_string(),
            "sync:3".to_string(),
            "fetch:pa_1:22024".to_string(),
        ]
    );
}

#[tokio::test]
async fn malformed_payload_fails_before_the_service_runs() {
    let (teller, _, services) = recording_services();
    let registry = build_registry(&services);

    let err = registry
        .dispatch(&Job::new("new_teller_link", json!({ "user_id": 7 })))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Job(JobError::MalformedPayload { ref job_type, .. }) if job_type == "new_teller_link"
    ));
    assert!(teller.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn daily_balance_job_updates_the_stored_summary() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("handlers.db");
    let db_path = init(&path.to_string_lossy()).unwrap();
    let pool = create_pool(&db_path).unwrap();
    run_migrations(&pool).unwrap();
    let writer = spawn_writer((*pool).clone());

    let budget_repo = Arc::new(BudgetRepository::new(pool.clone(), writer.clone()));
    let tx_repo = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let month = MonthYear::new(3, 2024).unwrap();
    let summary = budget_repo
        .create_summary(NewMonthlySummary {
            id: None,
            user_id: "42".to_string(),
            month_year: month,
            starting_balance: 1000.0,
            income: 4000.0,
            fixed_expenses: 1500.0,
            saving_target_percentage: 0.2,
        })
        .await
        .unwrap();
    budget_repo
        .create_category(NewMonthlyBudgetCategory {
            id: None,
            monthly_summary_id: summary.id.clone(),
            category: "dining".to_string(),
            budget: 300.0,
        })
        .await
        .unwrap();

    let (_, _, mut services) = recording_services();
    services.budget = Arc::new(BudgetService::new(budget_repo.clone(), tx_repo));
    let registry = build_registry(&services);

    registry
        .dispatch(&Job::new(
            "process_daily_balance",
            json!({ "user_id": 42, "month_year": 32024 }),
        ))
        .await
        .unwrap();

    let stored = budget_repo.get_summary("42", month).unwrap().unwrap();
    assert_eq!(stored.version, summary.version + 1);
    assert_eq!(stored.total_spent, 0.0);
}
