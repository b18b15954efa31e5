//! Handlers for the `hello_world` and `print_message` smoke-test jobs.

use async_trait::async_trait;
use log::info;

use super::jobs_model::{Job, JobType};
use super::jobs_traits::JobHandler;
use crate::errors::Result;

/// Logs the job's message and succeeds.
pub struct DiagnosticJobHandler {
    job_type: JobType,
}

impl DiagnosticJobHandler {
    pub fn hello_world() -> Self {
        Self {
            job_type: JobType::HelloWorld,
        }
    }

    pub fn print_message() -> Self {
        Self {
            job_type: JobType::PrintMessage,
        }
    }

    pub fn job_type(&self) -> JobType {
        self.job_type
    }
}

/// The payload is normally a bare JSON string; anything else is logged as JSON.
pub fn message_text(data: &serde_json::Value) -> String {
    match data {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl JobHandler for DiagnosticJobHandler {
    async fn process(&self, job: &Job) -> Result<()> {
        let message = message_text(&job.data);
        match self.job_type {
            JobType::HelloWorld => info!("Hello, World! Message: {}", message),
            _ => info!("Message: {}", message),
        }
        Ok(())
    }
}
