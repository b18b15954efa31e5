//! Jobs module - queue contract, registry, worker pool and payloads.

mod diagnostics;
mod job_enqueuer;
mod job_registry;
mod jobs_model;
mod jobs_traits;
mod memory_queue;
mod worker_pool;

pub use diagnostics::{message_text, DiagnosticJobHandler};
pub use job_enqueuer::JobEnqueuer;
pub use job_registry::JobRegistry;
pub use jobs_model::{
    new_job_id, FetchPlaidTransactionsPayload, FetchTransactionsPayload, InitialPlaidSyncPayload,
    Job, JobType, NewTellerLinkPayload, ProcessDailyBalancePayload, SyncPlaidAccountsPayload,
};
pub use jobs_traits::{JobHandler, JobQueueTrait};
pub use memory_queue::InMemoryJobQueue;
pub use worker_pool::{run_job, WorkerPool, WorkerPoolHandle};
