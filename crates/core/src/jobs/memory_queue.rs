//! Process-local queue with the same semantics as the Redis-backed one.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio::time::Instant;

use super::jobs_model::Job;
use super::jobs_traits::JobQueueTrait;
use crate::errors::{Error, Result};

#[derive(Default)]
pub struct InMemoryJobQueue {
    jobs: Mutex<VecDeque<Job>>,
    notify: Notify,
}

impl InMemoryJobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().map(|q| q.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copies of the queued jobs, oldest first.
    pub fn snapshot(&self) -> Vec<Job> {
        self.jobs
            .lock()
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn pop_front(&self) -> Result<Option<Job>> {
        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| Error::Queue("in-memory queue lock poisoned".to_string()))?;
        Ok(jobs.pop_front())
    }
}

#[async_trait]
impl JobQueueTrait for InMemoryJobQueue {
    async fn push(&self, job: &Job) -> Result<()> {
        {
            let mut jobs = self
                .jobs
                .lock()
                .map_err(|_| Error::Queue("in-memory queue lock poisoned".to_string()))?;
            jobs.push_back(job.clone());
        }
        self.notify.notify_one();
        Ok(())
    }

    async fn pop(&self, timeout: Duration) -> Result<Option<Job>> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(job) = self.pop_front()? {
                return Ok(Some(job));
            }
            // notify_one stores a permit when nobody is waiting, so a push
            // between the check above and this await is not lost.
            if tokio::time::timeout_at(deadline, self.notify.notified())
                .await
                .is_err()
            {
                return self.pop_front();
            }
        }
    }
}
