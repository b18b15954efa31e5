//! Job envelope, job types and typed payloads.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::JOB_ID_PREFIX;
use crate::errors::{Error, JobError, Result};
use crate::utils::serde_utils::string_or_number;
use crate::utils::time_utils::MonthYear;

/// Every job type the worker knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    HelloWorld,
    PrintMessage,
    NewTellerLink,
    FetchTransactions,
    InitialPlaidSync,
    FetchPlaidTransactions,
    SyncPlaidAccounts,
    ProcessDailyBalance,
}

impl JobType {
    pub const ALL: [JobType; 8] = [
        JobType::HelloWorld,
        JobType::PrintMessage,
        JobType::NewTellerLink,
        JobType::FetchTransactions,
        JobType::InitialPlaidSync,
        JobType::FetchPlaidTransactions,
        JobType::SyncPlaidAccounts,
        JobType::ProcessDailyBalance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::HelloWorld => "hello_world",
            JobType::PrintMessage => "print_message",
            JobType::NewTellerLink => "new_teller_link",
            JobType::FetchTransactions => "fetch_transactions",
            JobType::InitialPlaidSync => "initial_plaid_sync",
            JobType::FetchPlaidTransactions => "fetch_plaid_transactions",
            JobType::SyncPlaidAccounts => "sync_plaid_accounts",
            JobType::ProcessDailyBalance => "process_daily_balance",
        }
    }
}

impl FromStr for JobType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        JobType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| JobError::UnknownType(s.to_string()).into())
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The envelope stored in the queue.
///
/// `job_type` stays a raw string so that jobs with unknown types can still be
/// dequeued and reported as failed rather than poisoning the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(rename = "type")]
    pub job_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(job_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: new_job_id(),
            job_type: job_type.into(),
            data,
            created_at: Utc::now(),
        }
    }

    pub fn kind(&self) -> Result<JobType> {
        self.job_type.parse()
    }

    /// Decodes `data` into the payload type of this job.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.data.clone()).map_err(|e| {
            JobError::MalformedPayload {
                job_type: self.job_type.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::Queue(format!("Corrupt job envelope: {}", e)))
    }
}

/// Time-ordered, process-unique job id.
pub fn new_job_id() -> String {
    format!("{}{}", JOB_ID_PREFIX, Uuid::now_v7().simple())
}

// ─────────────────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────────────────

/// `new_teller_link`: a user finished Teller Connect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTellerLinkPayload {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(alias = "token")]
    pub access_token: String,
}

/// `fetch_transactions`: pull one Teller account's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchTransactionsPayload {
    pub account_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(alias = "teller_institution_id")]
    pub institution_id: String,
    pub access_token: String,
    pub transactions_link: String,
}

/// `initial_plaid_sync`: first sync after a public-token exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialPlaidSyncPayload {
    pub access_token: String,
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<String>,
}

/// `sync_plaid_accounts`: refresh every Plaid account of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPlaidAccountsPayload {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
}

/// `fetch_plaid_transactions`: pull one Plaid account's transactions for a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchPlaidTransactionsPayload {
    pub account_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month_year: Option<MonthYear>,
}

/// `process_daily_balance`: recompute a user's allowances for a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessDailyBalancePayload {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    pub month_year: MonthYear,
}

fn optional_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "string_or_number")] String);

    Option::<Wrapper>::deserialize(deserializer).map(|w| w.map(|Wrapper(s)| s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_type_round_trips_through_wire_names() {
        for t in JobType::ALL {
            assert_eq!(t.as_str().parse::<JobType>().unwrap(), t);
            assert_eq!(
                serde_json::to_value(t).unwrap(),
                serde_json::Value::String(t.as_str().to_string())
            );
        }
    }

    #[test]
    fn unknown_job_type_is_rejected() {
        let err = "bogus".parse::<JobType>().unwrap_err();
        assert!(matches!(err, Error::Job(JobError::UnknownType(ref t)) if t == "bogus"));
    }

    #[test]
    fn envelope_uses_type_key_and_defaults_missing_data() {
        let raw = r#"{"id":"job_1","type":"hello_world","created_at":"2026-10-01T12:00:00Z"}"#;
        let job = Job::from_json(raw).unwrap();
        assert_eq!(job.job_type, "hello_world");
        assert!(job.data.is_null());

        let out: serde_json::Value = serde_json::from_str(&job.to_json().unwrap()).unwrap();
        assert_eq!(out["type"], "hello_world");
        assert!(out.get("job_type").is_none());
    }

    #[test]
    fn job_ids_are_prefixed_and_unique() {
        let a = Job::new("hello_world", json!("hi"));
        let b = Job::new("hello_world", json!("hi"));
        assert!(a.id.starts_with("job_"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn teller_link_payload_accepts_legacy_token_key() {
        let job = Job::new(
            "new_teller_link",
            json!({"token": "tok_abc", "user_id": 7}),
        );
        let payload: NewTellerLinkPayload = job.payload().unwrap();
        assert_eq!(payload.access_token, "tok_abc");
        assert_eq!(payload.user_id, "7");
    }

    #[test]
    fn fetch_transactions_payload_accepts_legacy_institution_key() {
        let job = Job::new(
            "fetch_transactions",
            json!({
                "account_id": "acc_1",
                "user_id": "u1",
                "teller_institution_id": "inst_1",
                "access_token": "tok",
                "transactions_link": "https://api.teller.io/accounts/acc_1/transactions"
            }),
        );
        let payload: FetchTransactionsPayload = job.payload().unwrap();
        assert_eq!(payload.institution_id, "inst_1");
    }

    #[test]
    fn malformed_payload_names_the_job_type() {
        let job = Job::new("process_daily_balance", json!({"user_id": "u1"}));
        let err = job.payload::<ProcessDailyBalancePayload>().unwrap_err();
        match err {
            Error::Job(JobError::MalformedPayload { job_type, .. }) => {
                assert_eq!(job_type, "process_daily_balance")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn plaid_fetch_month_is_optional() {
        let job = Job::new(
            "fetch_plaid_transactions",
            json!({"account_id": "a", "user_id": 3}),
        );
        let payload: FetchPlaidTransactionsPayload = job.payload().unwrap();
        assert!(payload.month_year.is_none());

        let job = Job::new(
            "fetch_plaid_transactions",
            json!({"account_id": "a", "user_id": 3, "month_year": 92026}),
        );
        let payload: FetchPlaidTransactionsPayload = job.payload().unwrap();
        assert_eq!(payload.month_year.unwrap().month(), 9);
    }

    #[test]
    fn initial_plaid_sync_user_is_optional() {
        let job = Job::new("initial_plaid_sync", json!({"access_token": "access-1"}));
        let payload: InitialPlaidSyncPayload = job.payload().unwrap();
        assert!(payload.user_id.is_none());

        let job = Job::new(
            "initial_plaid_sync",
            json!({"access_token": "access-1", "user_id": 12}),
        );
        let payload: InitialPlaidSyncPayload = job.payload().unwrap();
        assert_eq!(payload.user_id.as_deref(), Some("12"));
    }
}
