//! Linked bank accounts and aggregator credentials.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A Teller enrollment owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Institution {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub teller_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for recording a Teller enrollment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstitution {
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub teller_id: String,
    pub access_token: String,
}

/// A bank account reported by Teller.
///
/// `id`, `user_id`, `institution_id`, `enrollment_id` and
/// `institution_external_id` are fixed at first insert; everything else is
/// refreshed on every link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TellerAccount {
    pub id: String,
    pub user_id: String,
    pub institution_id: String,
    pub enrollment_id: Option<String>,
    pub name: String,
    pub account_type: String,
    pub subtype: Option<String>,
    pub currency: Option<String>,
    pub last_four: Option<String>,
    pub status: Option<String>,
    pub institution_external_id: Option<String>,
    pub institution_name: Option<String>,
    pub self_link: Option<String>,
    pub details_link: Option<String>,
    pub balances_link: Option<String>,
    pub transactions_link: Option<String>,
}

/// A Plaid access token waiting for, or past, its initial sync.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaidToken {
    pub id: String,
    pub user_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    pub item_id: String,
    pub is_processed: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaidToken {
    pub user_id: String,
    pub access_token: String,
    pub item_id: String,
}

/// A bank account reported by Plaid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaidAccount {
    pub id: String,
    pub user_id: String,
    pub plaid_token_id: String,
    pub available_balance: f64,
    pub current_balance: f64,
    pub currency: Option<String>,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub subtype: Option<String>,
    pub is_synced: bool,
}
