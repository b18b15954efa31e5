use async_trait::async_trait;
use log::{debug, info};
use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::AsyncCommands;
use std::sync::Mutex;
use std::time::Duration;

use watson_core::constants::MIN_DEQUEUE_TIMEOUT;
use watson_core::errors::{Error, Result};
use watson_core::jobs::{Job, JobQueueTrait};

fn queue_error(op: &str, err: redis::RedisError) -> Error {
    Error::Queue(format!("redis {}: {}", op, err))
}

/// Accepts either a full `redis://` URL or a bare `host:port`.
pub fn normalize_redis_url(addr: &str) -> String {
    let addr = addr.trim();
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("redis://{}", addr)
    }
}

/// Job queue stored in a Redis list.
///
/// Pushes share one auto-reconnecting `ConnectionManager`. A blocking pop
/// parks its connection for up to the timeout, so pops use their own
/// connections, recycled through a small idle stack.
pub struct RedisJobQueue {
    client: redis::Client,
    manager: ConnectionManager,
    key: String,
    idle: Mutex<Vec<MultiplexedConnection>>,
}

impl RedisJobQueue {
    /// Opens the client and verifies the server answers `PING`.
    pub async fn connect(url: &str, key: impl Into<String>) -> Result<Self> {
        let url = normalize_redis_url(url);
        let client = redis::Client::open(url.as_str()).map_err(|e| queue_error("client open", e))?;
        let manager = ConnectionManager::new(client.clone())
            .await
            .map_err(|e| queue_error("connect", e))?;

        let queue = Self {
            client,
            manager,
            key: key.into(),
            idle: Mutex::new(Vec::new()),
        };
        queue.ping().await?;
        info!("Connected to Redis queue '{}'", queue.key);
        Ok(queue)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.manager.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| queue_error("ping", e))?;
        Ok(())
    }

    /// Number of jobs waiting in the list.
    pub async fn depth(&self) -> Result<usize> {
        let mut conn = self.manager.clone();
        conn.llen(&self.key)
            .await
            .map_err(|e| queue_error("llen", e))
    }

    async fn blocking_connection(&self) -> Result<MultiplexedConnection> {
        let parked = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        match parked {
            Some(conn) => Ok(conn),
            None => self
                .client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| queue_error("connect", e)),
        }
    }

    fn park(&self, conn: MultiplexedConnection) {
        if let Ok(mut idle) = self.idle.lock() {
            idle.push(conn);
        }
    }
}

fn brpop_timeout_secs(timeout: Duration) -> f64 {
    timeout.max(MIN_DEQUEUE_TIMEOUT).as_secs_f64()
}

#[async_trait]
impl JobQueueTrait for RedisJobQueue {
    async fn push(&self, job: &Job) -> Result<()> {
        let payload = job.to_json()?;
        let mut conn = self.manager.clone();
        let _: () = conn
            .lpush(&self.key, payload)
            .await
            .map_err(|e| queue_error("lpush", e))?;
        debug!("LPUSH {} -> {}", job.id, self.key);
        Ok(())
    }

    async fn pop(&self, timeout: Duration) -> Result<Option<Job>> {
        // BRPOP treats 0 as "wait forever".
        let timeout = brpop_timeout_secs(timeout);
        let mut conn = self.blocking_connection().await?;
        // A failed connection is dropped instead of parked.
        let popped: Option<(String, String)> = conn
            .brpop(&self.key, timeout)
            .await
            .map_err(|e| queue_error("brpop", e))?;
        self.park(conn);

        match popped {
            Some((_key, raw)) => Job::from_json(&raw).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brpop_timeout_is_never_zero() {
        assert_eq!(brpop_timeout_secs(Duration::ZERO), 0.01);
        assert_eq!(brpop_timeout_secs(Duration::from_secs(5)), 5.0);
    }

    #[test]
    fn bare_address_gets_a_scheme() {
        assert_eq!(normalize_redis_url("localhost:6379"), "redis://localhost:6379");
        assert_eq!(
            normalize_redis_url(" redis://cache:6380/2 "),
            "redis://cache:6380/2"
        );
        assert_eq!(normalize_redis_url("rediss://secure:6379"), "rediss://secure:6379");
    }

    #[tokio::test]
    #[ignore = "requires a running Redis on REDIS_URL or localhost:6379"]
    async fn push_then_pop_is_fifo() {
        let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "localhost:6379".to_string());
        let key = format!("watson_test_{}", watson_core::jobs::new_job_id());
        let queue = RedisJobQueue::connect(&url, key).await.unwrap();

        let first = Job::new("print_message", serde_json::json!({"message": "one"}));
        let second = Job::new("print_message", serde_json::json!({"message": "two"}));
        queue.push(&first).await.unwrap();
        queue.push(&second).await.unwrap();
        assert_eq!(queue.depth().await.unwrap(), 2);

        let popped = queue.pop(Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(popped.id, first.id);
        let popped = queue.pop(Duration::from_secs(1)).await.unwrap().unwrap();
        assert_eq!(popped.id, second.id);
        assert!(queue.pop(Duration::from_secs(1)).await.unwrap().is_none());
    }
}
