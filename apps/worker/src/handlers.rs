//! Binds each job type to the service that runs it.

use async_trait::async_trait;
use std::sync::Arc;

use watson_connect::{PlaidSyncServiceTrait, TellerSyncServiceTrait};
use watson_core::budget::BudgetServiceTrait;
use watson_core::errors::Result;
use watson_core::jobs::{
    DiagnosticJobHandler, FetchPlaidTransactionsPayload, FetchTransactionsPayload,
    InitialPlaidSyncPayload, Job, JobHandler, JobRegistry, JobType, NewTellerLinkPayload,
    ProcessDailyBalancePayload, SyncPlaidAccountsPayload,
};

/// The services job handlers delegate to.
#[derive(Clone)]
pub struct WorkerServices {
    pub teller: Arc<dyn TellerSyncServiceTrait>,
    pub plaid: Arc<dyn PlaidSyncServiceTrait>,
    pub budget: Arc<dyn BudgetServiceTrait>,
}

pub struct NewTellerLinkHandler {
    service: Arc<dyn TellerSyncServiceTrait>,
}

#[async_trait]
impl JobHandler for NewTellerLinkHandler {
    async fn process(&self, job: &Job) -> Result<()> {
        let payload: NewTellerLinkPayload = job.payload()?;
        self.service
            .handle_new_link(&payload.user_id, &payload.access_token)
            .await?;
        Ok(())
    }
}

pub struct FetchTransactionsHandler {
    service: Arc<dyn TellerSyncServiceTrait>,
}

#[async_trait]
impl JobHandler for FetchTransactionsHandler {
    async fn process(&self, job: &Job) -> Result<()> {
        let payload: FetchTransactionsPayload = job.payload()?;
        self.service.fetch_transactions(&payload).await?;
        Ok(())
    }
}

pub struct InitialPlaidSyncHandler {
    service: Arc<dyn PlaidSyncServiceTrait>,
}

#[async_trait]
impl JobHandler for InitialPlaidSyncHandler {
    async fn process(&self, job: &Job) -> Result<()> {
        let payload: InitialPlaidSyncPayload = job.payload()?;
        self.service.initial_sync(&payload).await?;
        Ok(())
    }
}

pub struct SyncPlaidAccountsHandler {
    service: Arc<dyn PlaidSyncServiceTrait>,
}

#[async_trait]
impl JobHandler for SyncPlaidAccountsHandler {
    async fn process(&self, job: &Job) -> Result<()> {
        let payload: SyncPlaidAccountsPayload = job.payload()?;
        self.service.sync_accounts(&payload.user_id).await?;
        Ok(())
    }
}

pub struct FetchPlaidTransactionsHandler {
    service: Arc<dyn PlaidSyncServiceTrait>,
}

#[async_trait]
impl JobHandler for FetchPlaidTransactionsHandler {
    async fn process(&self, job: &Job) -> Result<()> {
        let payload: FetchPlaidTransactionsPayload = job.payload()?;
        self.service.fetch_transactions(&payload).await?;
        Ok(())
    }
}

pub struct DailyBalanceHandler {
    service: Arc<dyn BudgetServiceTrait>,
}

#[async_trait]
impl JobHandler for DailyBalanceHandler {
    async fn process(&self, job: &Job) -> Result<()> {
        let payload: ProcessDailyBalancePayload = job.payload()?;
        let report = self
            .service
            .process_daily_balance(&payload.user_id, payload.month_year)
            .await?;
        tracing::debug!(
            "Summary {} recomputed on day {}",
            report.summary_id,
            report.days_into_month
        );
        Ok(())
    }
}

/// Registry with a handler for every known job type.
pub fn build_registry(services: &WorkerServices) -> JobRegistry {
    JobRegistry::new()
        .with_handler(
            JobType::HelloWorld,
            Arc::new(DiagnosticJobHandler::hello_world()),
        )
        .with_handler(
            JobType::PrintMessage,
            Arc::new(DiagnosticJobHandler::print_message()),
        )
        .with_handler(
            JobType::NewTellerLink,
            Arc::new(NewTellerLinkHandler {
                service: services.teller.clone(),
            }),
        )
        .with_handler(
            JobType::FetchTransactions,
            Arc::new(FetchTransactionsHandler {
                service: services.teller.clone(),
            }),
        )
        .with_handler(
            JobType::InitialPlaidSync,
            Arc::new(InitialPlaidSyncHandler {
                service: services.plaid.clone(),
            }),
        )
        .with_handler(
            JobType::SyncPlaidAccounts,
            Arc::new(SyncPlaidAccountsHandler {
                service: services.plaid.clone(),
            }),
        )
        .with_handler(
            JobType::FetchPlaidTransactions,
            Arc::new(FetchPlaidTransactionsHandler {
                service: services.plaid.clone(),
            }),
        )
        .with_handler(
            JobType::ProcessDailyBalance,
            Arc::new(DailyBalanceHandler {
                service: services.budget.clone(),
            }),
        )
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;
