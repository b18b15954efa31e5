//! Plaid API models.

use serde::{Deserialize, Serialize};

/// A Plaid account from `/accounts/get` or `/transactions/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaidApiAccount {
    pub account_id: String,
    #[serde(default)]
    pub balances: PlaidBalances,
    pub name: String,
    #[serde(default)]
    pub official_name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaidBalances {
    #[serde(default)]
    pub available: Option<f64>,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaidApiTransaction {
    pub transaction_id: String,
    pub account_id: String,
    pub amount: f64,
    #[serde(default)]
    pub iso_currency_code: Option<String>,
    pub date: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub pending: bool,
    #[serde(default)]
    pub payment_channel: Option<String>,
    /// Legacy category hierarchy, most general first.
    #[serde(default)]
    pub category: Option<Vec<String>>,
    #[serde(default)]
    pub personal_finance_category: Option<PlaidPersonalFinanceCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaidPersonalFinanceCategory {
    pub primary: String,
    #[serde(default)]
    pub detailed: Option<String>,
}

/// One page of `/transactions/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaidTransactionsPage {
    #[serde(default)]
    pub transactions: Vec<PlaidApiTransaction>,
    pub total_transactions: usize,
}

/// Result of `/item/public_token/exchange`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaidTokenExchange {
    pub access_token: String,
    pub item_id: String,
}

/// Outcome of the initial sync of a Plaid item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaidSyncSummary {
    pub accounts_saved: usize,
    pub jobs_enqueued: usize,
}
