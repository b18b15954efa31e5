use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use watson_connect::{PlaidEnvironment, DEFAULT_TELLER_API_URL};
use watson_core::constants::{DEFAULT_DEQUEUE_TIMEOUT, DEFAULT_WORKER_COUNT, JOB_QUEUE_KEY};
use watson_core::errors::{Error, Result};

pub const DEFAULT_REDIS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_WORKER_PORT: u16 = 8081;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub queue_key: String,
    pub listen_addr: SocketAddr,
    pub database_url: String,
    pub worker_count: usize,
    pub dequeue_timeout: Duration,
    pub enqueue_sample_jobs: bool,
    pub teller_api_url: String,
    pub teller_cert_path: PathBuf,
    pub teller_key_path: PathBuf,
    pub plaid_client_id: String,
    pub plaid_secret: String,
    pub plaid_env: PlaidEnvironment,
    pub log_format: LogFormat,
}

impl Config {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| var(key).ok_or_else(|| Error::MissingConfigKey(key.to_string()));

        let redis_url = var("REDIS_ADDR")
            .or_else(|| var("REDIS_URL"))
            .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());

        let port: u16 = parse_or("WORKER_PORT", var("WORKER_PORT"), DEFAULT_WORKER_PORT)?;

        let worker_count: usize =
            parse_or("WATSON_WORKER_COUNT", var("WATSON_WORKER_COUNT"), DEFAULT_WORKER_COUNT)?;
        if worker_count == 0 {
            return Err(Error::InvalidConfigValue(
                "WATSON_WORKER_COUNT must be at least 1".to_string(),
            ));
        }

        let dequeue_secs: u64 = parse_or(
            "WATSON_DEQUEUE_TIMEOUT_SECS",
            var("WATSON_DEQUEUE_TIMEOUT_SECS"),
            DEFAULT_DEQUEUE_TIMEOUT.as_secs(),
        )?;
        if dequeue_secs == 0 {
            return Err(Error::InvalidConfigValue(
                "WATSON_DEQUEUE_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        let enqueue_sample_jobs = match var("WATSON_ENQUEUE_SAMPLE_JOBS") {
            Some(v) => parse_bool("WATSON_ENQUEUE_SAMPLE_JOBS", &v)?,
            None => false,
        };

        let plaid_env = match var("PLAID_ENV") {
            Some(v) => v.parse::<PlaidEnvironment>()?,
            None => PlaidEnvironment::Sandbox,
        };

        let log_format = match var("WATSON_LOG_FORMAT").as_deref() {
            None => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("text") => LogFormat::Text,
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(other) => {
                return Err(Error::InvalidConfigValue(format!(
                    "WATSON_LOG_FORMAT must be 'text' or 'json', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            redis_url,
            queue_key: var("WATSON_QUEUE_KEY").unwrap_or_else(|| JOB_QUEUE_KEY.to_string()),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], port)),
            database_url: required("DATABASE_URL")?,
            worker_count,
            dequeue_timeout: Duration::from_secs(dequeue_secs),
            enqueue_sample_jobs,
            teller_api_url: var("TELLER_API_URL")
                .unwrap_or_else(|| DEFAULT_TELLER_API_URL.to_string()),
            teller_cert_path: var("TELLER_CERT_PATH")
                .unwrap_or_else(|| "./certs/certificate.pem".to_string())
                .into(),
            teller_key_path: var("TELLER_KEY_PATH")
                .unwrap_or_else(|| "./certs/private_key.pem".to_string())
                .into(),
            plaid_client_id: required("PLAID_CLIENT_ID")?,
            plaid_secret: required("PLAID_SECRET")?,
            plaid_env,
            log_format,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(v) => v
            .parse()
            .map_err(|_| Error::InvalidConfigValue(format!("{}='{}'", key, v))),
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidConfigValue(format!("{}='{}'", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "/tmp/watson.db"),
        ("PLAID_CLIENT_ID", "client"),
        ("PLAID_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply() {
        let cfg = config(&REQUIRED).unwrap();
        assert_eq!(cfg.redis_url, DEFAULT_REDIS_URL);
        assert_eq!(cfg.queue_key, "job_queue");
        assert_eq!(cfg.listen_addr.port(), 8081);
        assert_eq!(cfg.worker_count, 10);
        assert_eq!(cfg.dequeue_timeout, Duration::from_secs(5));
        assert!(!cfg.enqueue_sample_jobs);
        assert_eq!(cfg.plaid_env, PlaidEnvironment::Sandbox);
        assert_eq!(cfg.log_format, LogFormat::Text);
        assert_eq!(cfg.teller_cert_path, PathBuf::from("./certs/certificate.pem"));
    }

    #[test]
    fn dequeue_timeout_is_read_in_seconds() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("WATSON_DEQUEUE_TIMEOUT_SECS", "2"));
        assert_eq!(config(&vars).unwrap().dequeue_timeout, Duration::from_secs(2));
    }

    #[test]
    fn redis_addr_wins_over_redis_url() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("REDIS_ADDR", "cache:6379"));
        vars.push(("REDIS_URL", "redis://other:6379"));
        assert_eq!(config(&vars).unwrap().redis_url, "cache:6379");
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = config(&REQUIRED[1..]).unwrap_err();
        assert!(matches!(err, Error::MissingConfigKey(ref k) if k == "DATABASE_URL"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for (key, value) in [
            ("WATSON_WORKER_COUNT", "0"),
            ("WATSON_WORKER_COUNT", "many"),
            ("WATSON_DEQUEUE_TIMEOUT_SECS", "0"),
            ("WATSON_DEQUEUE_TIMEOUT_SECS", "-1"),
            ("WORKER_PORT", "99999"),
            ("PLAID_ENV", "development"),
            ("WATSON_LOG_FORMAT", "xml"),
            ("WATSON_ENQUEUE_SAMPLE_JOBS", "maybe"),
        ] {
            let mut vars = REQUIRED.to_vec();
            vars.push((key, value));
            assert!(
                matches!(config(&vars), Err(Error::InvalidConfigValue(_))),
                "{key}={value} should be rejected"
            );
        }
    }
}
