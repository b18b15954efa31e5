//! Redis-backed durable job queue.
//!
//! Producers `LPUSH` JSON job envelopes onto a list; workers `BRPOP` from the
//! other end, giving FIFO order. A popped job is gone from Redis.

mod queue;

pub use queue::{normalize_redis_url, RedisJobQueue};
