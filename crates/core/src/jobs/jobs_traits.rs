use std::time::Duration;

use async_trait::async_trait;

use super::jobs_model::Job;
use crate::errors::Result;

/// A FIFO job channel shared by producers and workers.
#[async_trait]
pub trait JobQueueTrait: Send + Sync {
    /// Appends a job at the tail.
    async fn push(&self, job: &Job) -> Result<()>;

    /// Removes and returns the oldest job, blocking up to `timeout`.
    ///
    /// Returns `Ok(None)` when nothing arrived in time. Removal is final:
    /// a job popped here is never handed to another worker.
    async fn pop(&self, timeout: Duration) -> Result<Option<Job>>;
}

/// Runs one kind of job.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn process(&self, job: &Job) -> Result<()>;
}
