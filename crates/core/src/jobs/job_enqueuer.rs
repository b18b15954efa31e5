use std::sync::Arc;

use log::debug;
use serde::Serialize;

use super::jobs_model::{Job, JobType};
use super::jobs_traits::JobQueueTrait;
use crate::errors::{Result, ValidationError};

/// Producer side of the queue.
///
/// Used by the HTTP layer for externally submitted jobs and by sync services
/// to fan out follow-up work.
#[derive(Clone)]
pub struct JobEnqueuer {
    queue: Arc<dyn JobQueueTrait>,
}

impl JobEnqueuer {
    pub fn new(queue: Arc<dyn JobQueueTrait>) -> Self {
        Self { queue }
    }

    /// Enqueues a job with an arbitrary type name and returns its id.
    ///
    /// The type is not checked against the known job types; an unknown type
    /// fails when a worker dispatches it.
    pub async fn enqueue_raw(&self, job_type: &str, data: serde_json::Value) -> Result<String> {
        if job_type.trim().is_empty() {
            return Err(ValidationError::MissingField("type".to_string()).into());
        }
        let job = Job::new(job_type, data);
        self.queue.push(&job).await?;
        debug!("Enqueued job {} (type {})", job.id, job.job_type);
        Ok(job.id)
    }

    pub async fn enqueue<P>(&self, job_type: JobType, payload: &P) -> Result<String>
    where
        P: Serialize + Sync,
    {
        let data = serde_json::to_value(payload)?;
        self.enqueue_raw(job_type.as_str(), data).await
    }
}
