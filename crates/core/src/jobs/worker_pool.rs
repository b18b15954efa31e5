//! Fixed-size pool of workers draining the job queue.
//!
//! Each worker loops: pop (blocking up to the poll timeout), dispatch through
//! the registry, log the outcome. A failed job is logged and dropped. A failed
//! pop is logged and the loop continues after a short pause.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use log::{error, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::job_registry::JobRegistry;
use super::jobs_model::Job;
use super::jobs_traits::JobQueueTrait;
use crate::constants::{
    DEFAULT_DEQUEUE_TIMEOUT, DEFAULT_WORKER_COUNT, DEQUEUE_ERROR_PAUSE, MIN_DEQUEUE_TIMEOUT,
};
use crate::errors::{Error, JobError, Result};

pub struct WorkerPool {
    queue: Arc<dyn JobQueueTrait>,
    registry: Arc<JobRegistry>,
    worker_count: usize,
    poll_timeout: Duration,
    error_pause: Duration,
}

impl WorkerPool {
    pub fn new(queue: Arc<dyn JobQueueTrait>, registry: Arc<JobRegistry>) -> Self {
        Self {
            queue,
            registry,
            worker_count: DEFAULT_WORKER_COUNT,
            poll_timeout: DEFAULT_DEQUEUE_TIMEOUT,
            error_pause: DEQUEUE_ERROR_PAUSE,
        }
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count.max(1);
        self
    }

    /// Clamped to [`MIN_DEQUEUE_TIMEOUT`] so workers keep seeing the shutdown signal.
    pub fn with_poll_timeout(mut self, poll_timeout: Duration) -> Self {
        self.poll_timeout = poll_timeout.max(MIN_DEQUEUE_TIMEOUT);
        self
    }

    pub fn with_error_pause(mut self, error_pause: Duration) -> Self {
        self.error_pause = error_pause;
        self
    }

    /// Spawns the workers on the current Tokio runtime.
    pub fn start(self) -> WorkerPoolHandle {
        info!("Starting {} background workers", self.worker_count);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let workers = (1..=self.worker_count)
            .map(|worker_id| {
                let worker = Worker {
                    id: worker_id,
                    queue: self.queue.clone(),
                    registry: self.registry.clone(),
                    poll_timeout: self.poll_timeout,
                    error_pause: self.error_pause,
                };
                tokio::spawn(worker.run(shutdown_rx.clone()))
            })
            .collect();

        WorkerPoolHandle {
            shutdown_tx,
            workers,
        }
    }
}

/// Owns the running workers.
pub struct WorkerPoolHandle {
    shutdown_tx: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPoolHandle {
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Asks every worker to stop and waits for them.
    ///
    /// Workers finish the job in hand and notice the signal after their
    /// current pop returns, so this can take up to one poll timeout.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for result in join_all(self.workers).await {
            if let Err(e) = result {
                warn!("Worker task ended abnormally: {}", e);
            }
        }
        info!("All background workers stopped");
    }
}

struct Worker {
    id: usize,
    queue: Arc<dyn JobQueueTrait>,
    registry: Arc<JobRegistry>,
    poll_timeout: Duration,
    error_pause: Duration,
}

impl Worker {
    async fn run(self, shutdown: watch::Receiver<bool>) {
        info!("Worker {} started", self.id);
        while !*shutdown.borrow() {
            match self.queue.pop(self.poll_timeout).await {
                Ok(Some(job)) => self.process(&job).await,
                Ok(None) => {}
                Err(e) => {
                    error!("Worker {}: error dequeuing job: {}", self.id, e);
                    tokio::time::sleep(self.error_pause).await;
                }
            }
        }
        info!("Worker {} stopped", self.id);
    }

    async fn process(&self, job: &Job) {
        info!(
            "Worker {}: processing job {} (type {})",
            self.id, job.id, job.job_type
        );
        match run_job(&self.registry, job).await {
            Ok(()) => info!("Worker {}: completed job {}", self.id, job.id),
            Err(e) => error!(
                "Worker {}: job {} ({}) failed: {}",
                self.id, job.id, job.job_type, e
            ),
        }
    }
}

/// Dispatches a job, turning a handler panic into an ordinary job failure so
/// the worker survives it.
pub async fn run_job(registry: &JobRegistry, job: &Job) -> Result<()> {
    match AssertUnwindSafe(registry.dispatch(job)).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(Error::Job(JobError::Panicked(message)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::jobs_model::JobType;
    use crate::jobs::jobs_traits::JobHandler;
    use crate::jobs::memory_queue::InMemoryJobQueue;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct OrderHandler {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl JobHandler for OrderHandler {
        async fn process(&self, job: &Job) -> Result<()> {
            self.seen.lock().unwrap().push(job.id.clone());
            Ok(())
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl JobHandler for PanickingHandler {
        async fn process(&self, _job: &Job) -> Result<()> {
            panic!("boom");
        }
    }

    struct FlakyQueue {
        inner: InMemoryJobQueue,
        failures_left: AtomicUsize,
    }

    #[async_trait]
    impl JobQueueTrait for FlakyQueue {
        async fn push(&self, job: &Job) -> Result<()> {
            self.inner.push(job).await
        }

        async fn pop(&self, timeout: Duration) -> Result<Option<Job>> {
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(Error::Queue("connection reset".to_string()));
            }
            self.inner.pop(timeout).await
        }
    }

    async fn wait_for(seen: &Arc<Mutex<Vec<String>>>, count: usize) {
        for _ in 0..200 {
            if seen.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for {count} jobs");
    }

    #[tokio::test]
    async fn single_worker_processes_in_enqueue_order() {
        let queue = Arc::new(InMemoryJobQueue::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = JobRegistry::new().with_handler(
            JobType::PrintMessage,
            Arc::new(OrderHandler { seen: seen.clone() }),
        );

        let mut ids = Vec::new();
        for i in 0..5 {
            let job = Job::new("print_message", json!(format!("msg {i}")));
            ids.push(job.id.clone());
            queue.push(&job).await.unwrap();
        }

        let handle = WorkerPool::new(queue.clone(), Arc::new(registry))
            .with_worker_count(1)
            .with_poll_timeout(Duration::from_millis(20))
            .start();
        wait_for(&seen, 5).await;
        handle.shutdown().await;

        assert_eq!(*seen.lock().unwrap(), ids);
    }

    #[tokio::test]
    async fn worker_survives_failing_and_panicking_jobs() {
        let queue = Arc::new(InMemoryJobQueue::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = JobRegistry::new()
            .with_handler(JobType::HelloWorld, Arc::new(PanickingHandler))
            .with_handler(
                JobType::PrintMessage,
                Arc::new(OrderHandler { seen: seen.clone() }),
            );

        queue
            .push(&Job::new("not_a_job", json!(null)))
            .await
            .unwrap();
        queue
            .push(&Job::new("hello_world", json!("panic")))
            .await
            .unwrap();
        let last = Job::new("print_message", json!("still alive"));
        queue.push(&last).await.unwrap();

        let handle = WorkerPool::new(queue.clone(), Arc::new(registry))
            .with_worker_count(1)
            .with_poll_timeout(Duration::from_millis(20))
            .start();
        wait_for(&seen, 1).await;
        handle.shutdown().await;

        assert_eq!(*seen.lock().unwrap(), vec![last.id]);
    }

    #[tokio::test]
    async fn dequeue_errors_do_not_stop_the_worker() {
        let queue = Arc::new(FlakyQueue {
            inner: InMemoryJobQueue::new(),
            failures_left: AtomicUsize::new(3),
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = JobRegistry::new().with_handler(
            JobType::PrintMessage,
            Arc::new(OrderHandler { seen: seen.clone() }),
        );
        let job = Job::new("print_message", json!("after errors"));
        queue.push(&job).await.unwrap();

        let handle = WorkerPool::new(queue.clone(), Arc::new(registry))
            .with_worker_count(1)
            .with_poll_timeout(Duration::from_millis(20))
            .with_error_pause(Duration::from_millis(1))
            .start();
        wait_for(&seen, 1).await;
        handle.shutdown().await;

        assert_eq!(*seen.lock().unwrap(), vec![job.id]);
    }

    #[tokio::test]
    async fn worker_pauses_after_each_dequeue_error() {
        let queue = Arc::new(FlakyQueue {
            inner: InMemoryJobQueue::new(),
            failures_left: AtomicUsize::new(3),
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let registry = JobRegistry::new().with_handler(
            JobType::PrintMessage,
            Arc::new(OrderHandler { seen: seen.clone() }),
        );
        queue
            .push(&Job::new("print_message", json!("late")))
            .await
            .unwrap();

        let started = std::time::Instant::now();
        let handle = WorkerPool::new(queue.clone(), Arc::new(registry))
            .with_worker_count(1)
            .with_poll_timeout(Duration::from_millis(20))
            .with_error_pause(Duration::from_millis(50))
            .start();
        wait_for(&seen, 1).await;
        handle.shutdown().await;

        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn pool_spawns_requested_worker_count() {
        let queue = Arc::new(InMemoryJobQueue::new());
        let handle = WorkerPool::new(queue, Arc::new(JobRegistry::new()))
            .with_worker_count(4)
            .with_poll_timeout(Duration::from_millis(10))
            .start();
        assert_eq!(handle.worker_count(), 4);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn zero_poll_timeout_is_clamped_and_shutdown_returns() {
        let pool = WorkerPool::new(Arc::new(InMemoryJobQueue::new()), Arc::new(JobRegistry::new()))
            .with_worker_count(2)
            .with_poll_timeout(Duration::ZERO);
        assert_eq!(pool.poll_timeout, MIN_DEQUEUE_TIMEOUT);

        let handle = pool.start();
        tokio::time::timeout(Duration::from_secs(2), handle.shutdown())
            .await
            .expect("idle workers stop after one poll");
    }

    #[tokio::test]
    async fn run_job_reports_panics_as_failures() {
        let registry = JobRegistry::new().with_handler(JobType::HelloWorld, Arc::new(PanickingHandler));
        let err = run_job(&registry, &Job::new("hello_world", json!("x")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Job(JobError::Panicked(ref m)) if m == "boom"));
    }
}
