use std::sync::Arc;

use serde_json::json;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};
use crate::handlers::{build_registry, WorkerServices};
use watson_connect::{PlaidClient, PlaidSyncService, TellerClient, TellerSyncService};
use watson_core::budget::BudgetService;
use watson_core::constants::DEQUEUE_ERROR_PAUSE;
use watson_core::jobs::{
    JobEnqueuer, JobQueueTrait, JobRegistry, JobType, WorkerPool, WorkerPoolHandle,
};
use watson_queue_redis::RedisJobQueue;
use watson_storage_sqlite::{
    create_pool, init, run_migrations, spawn_writer, BudgetRepository, InstitutionRepository,
    PlaidAccountRepository, PlaidTokenRepository, TellerAccountRepository, TransactionRepository,
};

pub struct AppState {
    pub queue: Arc<dyn JobQueueTrait>,
    pub enqueuer: JobEnqueuer,
    pub registry: Arc<JobRegistry>,
}

impl AppState {
    pub fn new(queue: Arc<dyn JobQueueTrait>, registry: Arc<JobRegistry>) -> Self {
        Self {
            enqueuer: JobEnqueuer::new(queue.clone()),
            queue,
            registry,
        }
    }
}

/// Installs the global subscriber. `log` records from the library crates are
/// forwarded through `tracing-log`.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(false)).init(),
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = init(&config.database_url)?;
    tracing::info!("Database path in use: {}", db_path);
    let pool = create_pool(&db_path)?;
    run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let institution_repo = Arc::new(InstitutionRepository::new(pool.clone(), writer.clone()));
    let teller_account_repo = Arc::new(TellerAccountRepository::new(pool.clone(), writer.clone()));
    let plaid_token_repo = Arc::new(PlaidTokenRepository::new(pool.clone(), writer.clone()));
    let plaid_account_repo = Arc::new(PlaidAccountRepository::new(pool.clone(), writer.clone()));
    let transaction_repo = Arc::new(TransactionRepository::new(pool.clone(), writer.clone()));
    let budget_repo = Arc::new(BudgetRepository::new(pool.clone(), writer.clone()));

    let queue: Arc<dyn JobQueueTrait> =
        Arc::new(RedisJobQueue::connect(&config.redis_url, config.queue_key.clone()).await?);
    let enqueuer = JobEnqueuer::new(queue.clone());

    let teller_client = Arc::new(TellerClient::from_pem_files(
        &config.teller_api_url,
        &config.teller_cert_path,
        &config.teller_key_path,
    )?);
    let plaid_client = Arc::new(PlaidClient::new(
        config.plaid_env,
        &config.plaid_client_id,
        &config.plaid_secret,
    )?);
    tracing::info!("Plaid environment: {}", config.plaid_env);

    let services = WorkerServices {
        teller: Arc::new(TellerSyncService::new(
            teller_client,
            institution_repo,
            teller_account_repo,
            transaction_repo.clone(),
            enqueuer.clone(),
        )),
        plaid: Arc::new(PlaidSyncService::new(
            plaid_client,
            plaid_token_repo,
            plaid_account_repo,
            transaction_repo.clone(),
            enqueuer,
        )),
        budget: Arc::new(BudgetService::new(budget_repo, transaction_repo)),
    };
    let registry = Arc::new(build_registry(&services));

    Ok(Arc::new(AppState::new(queue, registry)))
}

pub fn start_workers(state: &AppState, config: &Config) -> WorkerPoolHandle {
    WorkerPool::new(state.queue.clone(), state.registry.clone())
        .with_worker_count(config.worker_count)
        .with_poll_timeout(config.dequeue_timeout)
        .with_error_pause(DEQUEUE_ERROR_PAUSE)
        .start()
}

/// Pushes one of each diagnostic job so a fresh deployment shows activity.
pub async fn enqueue_sample_jobs(enqueuer: &JobEnqueuer) -> watson_core::Result<()> {
    let hello = enqueuer
        .enqueue_raw(JobType::HelloWorld.as_str(), json!({}))
        .await?;
    let message = enqueuer
        .enqueue_raw(
            JobType::PrintMessage.as_str(),
            json!("Hello from the Watson worker"),
        )
        .await?;
    tracing::info!("Enqueued sample jobs {} and {}", hello, message);
    Ok(())
}
