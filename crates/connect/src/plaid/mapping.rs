//! Conversion from Plaid API models to stored rows.

use chrono::NaiveDate;

use watson_core::accounts::PlaidAccount;
use watson_core::errors::Result;
use watson_core::transactions::{Transaction, TransactionProvider, TransactionStatus};

use super::models::{PlaidApiAccount, PlaidApiTransaction};

pub fn to_plaid_account(api: PlaidApiAccount, user_id: &str, plaid_token_id: &str) -> PlaidAccount {
    PlaidAccount {
        id: api.account_id,
        user_id: user_id.to_string(),
        plaid_token_id: plaid_token_id.to_string(),
        available_balance: api.balances.available.unwrap_or(0.0),
        current_balance: api.balances.current.unwrap_or(0.0),
        currency: api.balances.iso_currency_code,
        name: api.name,
        official_name: api.official_name,
        account_type: api.account_type,
        subtype: api.subtype,
        is_synced: false,
    }
}

/// Single lower-case category tag: the personal finance primary category,
/// else the first legacy category.
pub fn normalize_category(api: &PlaidApiTransaction) -> Option<String> {
    api.personal_finance_category
        .as_ref()
        .map(|pfc| pfc.primary.as_str())
        .or_else(|| {
            api.category
                .as_ref()
                .and_then(|c| c.first())
                .map(String::as_str)
        })
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase)
}

pub fn to_transaction(api: PlaidApiTransaction, user_id: &str) -> Result<Transaction> {
    let date = NaiveDate::parse_from_str(&api.date, "%Y-%m-%d")?;
    let categories = normalize_category(&api).into_iter().collect();

    Ok(Transaction {
        id: api.transaction_id,
        user_id: user_id.to_string(),
        provider: TransactionProvider::Plaid,
        account_id: api.account_id,
        institution_id: None,
        amount: api.amount,
        date,
        description: api.name,
        categories,
        currency: api.iso_currency_code,
        status: TransactionStatus::from_pending(api.pending),
        transaction_type: api.payment_channel,
        running_balance: None,
        processing_status: None,
        counterparty_name: api.merchant_name,
        counterparty_type: None,
        self_link: None,
        account_link: None,
    })
}
