use std::time::Duration;

/// Reserved budget category that absorbs every transaction not claimed by
/// another tracked category.
pub const GENERAL_CATEGORY: &str = "general";

/// Redis list holding pending jobs.
pub const JOB_QUEUE_KEY: &str = "job_queue";

/// Number of concurrent workers started by default.
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// How long a worker blocks on an empty queue before polling again.
pub const DEFAULT_DEQUEUE_TIMEOUT: Duration = Duration::from_secs(5);

/// Floor for any dequeue timeout. A zero `BRPOP` timeout blocks forever.
pub const MIN_DEQUEUE_TIMEOUT: Duration = Duration::from_millis(10);

/// Pause after a failed dequeue so a dead queue store does not spin the loop.
pub const DEQUEUE_ERROR_PAUSE: Duration = Duration::from_secs(1);

/// Prefix of every generated job id.
pub const JOB_ID_PREFIX: &str = "job_";

/// Days assumed per month when spreading a monthly budget.
pub const BUDGET_DAYS_PER_MONTH: f64 = 30.0;
