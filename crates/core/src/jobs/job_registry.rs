use std::collections::HashMap;
use std::sync::Arc;

use super::jobs_model::{Job, JobType};
use super::jobs_traits::JobHandler;
use crate::errors::{JobError, Result};

/// Maps each job type to the handler that runs it.
///
/// Built once at start-up and shared read-only by every worker.
#[derive(Default, Clone)]
pub struct JobRegistry {
    handlers: HashMap<JobType, Arc<dyn JobHandler>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `job_type`, replacing any previous one.
    pub fn with_handler(mut self, job_type: JobType, handler: Arc<dyn JobHandler>) -> Self {
        self.handlers.insert(job_type, handler);
        self
    }

    pub fn handles(&self, job_type: JobType) -> bool {
        self.handlers.contains_key(&job_type)
    }

    pub fn registered_types(&self) -> Vec<JobType> {
        JobType::ALL
            .iter()
            .copied()
            .filter(|t| self.handles(*t))
            .collect()
    }

    /// Runs the handler registered for the job's type.
    pub async fn dispatch(&self, job: &Job) -> Result<()> {
        let job_type = job.kind()?;
        let handler = self
            .handlers
            .get(&job_type)
            .ok_or_else(|| JobError::Unhandled(job_type.to_string()))?;
        handler.process(job).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct RecordingHandler {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl JobHandler for RecordingHandler {
        async fn process(&self, job: &Job) -> Result<()> {
            self.seen.lock().unwrap().push(job.id.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn dispatches_to_registered_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = JobRegistry::new().with_handler(
            JobType::HelloWorld,
            Arc::new(RecordingHandler { seen: seen.clone() }),
        );
        let job = Job::new("hello_world", json!("hi"));

        registry.dispatch(&job).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![job.id]);
        assert_eq!(registry.registered_types(), vec![JobType::HelloWorld]);
    }

    #[tokio::test]
    async fn unknown_type_fails_without_running_anything() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = JobRegistry::new().with_handler(
            JobType::HelloWorld,
            Arc::new(RecordingHandler { seen: seen.clone() }),
        );
        let job = Job::new("launch_rockets", json!({}));

        let err = registry.dispatch(&job).await.unwrap_err();

        assert!(matches!(err, Error::Job(JobError::UnknownType(_))));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn known_type_without_handler_fails() {
        let registry = JobRegistry::new();
        let job = Job::new("sync_plaid_accounts", json!({"user_id": "u"}));
        let err = registry.dispatch(&job).await.unwrap_err();
        assert!(matches!(err, Error::Job(JobError::Unhandled(_))));
    }
}
