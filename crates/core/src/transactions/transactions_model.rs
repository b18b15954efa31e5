//! Transactions domain models.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

/// Aggregator a transaction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionProvider {
    Teller,
    Plaid,
}

impl TransactionProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionProvider::Teller => "teller",
            TransactionProvider::Plaid => "plaid",
        }
    }
}

impl FromStr for TransactionProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teller" => Ok(TransactionProvider::Teller),
            "plaid" => Ok(TransactionProvider::Plaid),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown transaction provider: {}",
                other
            ))
            .into()),
        }
    }
}

impl fmt::Display for TransactionProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Posted,
    Pending,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Posted => "posted",
            TransactionStatus::Pending => "pending",
        }
    }

    pub fn from_pending(pending: bool) -> Self {
        if pending {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Posted
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "posted" => Ok(TransactionStatus::Posted),
            "pending" => Ok(TransactionStatus::Pending),
            other => Err(ValidationError::InvalidInput(format!(
                "Unknown transaction status: {}",
                other
            ))
            .into()),
        }
    }
}

/// A transaction as stored by the worker.
///
/// `id` is the aggregator's transaction id and is the upsert key, so
/// re-fetching the same period never duplicates rows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub provider: TransactionProvider,
    pub account_id: String,
    pub institution_id: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    pub description: String,
    /// Category tags; a transaction counts toward every budget category it carries.
    pub categories: Vec<String>,
    pub currency: Option<String>,
    pub status: TransactionStatus,
    pub transaction_type: Option<String>,
    pub running_balance: Option<f64>,
    pub processing_status: Option<String>,
    pub counterparty_name: Option<String>,
    pub counterparty_type: Option<String>,
    pub self_link: Option<String>,
    pub account_link: Option<String>,
}

impl Transaction {
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    pub fn has_any_category(&self, categories: &[String]) -> bool {
        self.categories.iter().any(|c| categories.contains(c))
    }
}
