//! Teller API models and sync results.

use serde::{Deserialize, Serialize};

/// An account as returned by `GET /accounts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TellerApiAccount {
    pub id: String,
    #[serde(default)]
    pub enrollment_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub last_four: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub institution: Option<TellerApiInstitution>,
    #[serde(default)]
    pub links: TellerAccountLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TellerApiInstitution {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TellerAccountLinks {
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub balances: Option<String>,
    #[serde(default)]
    pub transactions: Option<String>,
}

/// A transaction as returned by an account's transactions link.
///
/// Teller sends money as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TellerApiTransaction {
    pub id: String,
    pub account_id: String,
    pub amount: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    #[serde(rename = "type", default)]
    pub transaction_type: Option<String>,
    pub status: String,
    #[serde(default)]
    pub running_balance: Option<String>,
    #[serde(default)]
    pub details: Option<TellerTransactionDetails>,
    #[serde(default)]
    pub links: Option<TellerTransactionLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TellerTransactionDetails {
    #[serde(default)]
    pub processing_status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub counterparty: Option<TellerCounterparty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TellerCounterparty {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub counterparty_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TellerTransactionLinks {
    #[serde(rename = "self", default)]
    pub self_link: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
}

/// Outcome of handling a new Teller enrollment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TellerLinkSummary {
    pub accounts_seen: usize,
    pub accounts_saved: usize,
    pub jobs_enqueued: usize,
}
