//! Conversion from Teller API models to stored rows.

use chrono::NaiveDate;

use watson_core::accounts::TellerAccount;
use watson_core::errors::{Result, ValidationError};
use watson_core::transactions::{Transaction, TransactionProvider, TransactionStatus};

use super::models::{TellerApiAccount, TellerApiTransaction};

pub fn to_teller_account(
    api: TellerApiAccount,
    user_id: &str,
    institution_id: &str,
) -> TellerAccount {
    let (institution_external_id, institution_name) = match api.institution {
        Some(inst) => (Some(inst.id), inst.name),
        None => (None, None),
    };
    TellerAccount {
        id: api.id,
        user_id: user_id.to_string(),
        institution_id: institution_id.to_string(),
        enrollment_id: api.enrollment_id,
        name: api.name,
        account_type: api.account_type,
        subtype: api.subtype,
        currency: api.currency,
        last_four: api.last_four,
        status: api.status,
        institution_external_id,
        institution_name,
        self_link: api.links.self_link,
        details_link: api.links.details,
        balances_link: api.links.balances,
        transactions_link: api.links.transactions,
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|e| {
        ValidationError::InvalidInput(format!("Invalid {} '{}': {}", field, raw, e)).into()
    })
}

/// Maps one Teller transaction. Fails on an unparseable amount, balance,
/// date or status so the caller can reject the whole batch before writing.
pub fn to_transaction(
    api: TellerApiTransaction,
    user_id: &str,
    institution_id: &str,
) -> Result<Transaction> {
    let amount = parse_amount("amount", &api.amount)?;
    let running_balance = match api.running_balance.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_amount("running balance", raw)?),
        _ => None,
    };
    let date = NaiveDate::parse_from_str(&api.date, "%Y-%m-%d")?;
    let status = api.status.parse::<TransactionStatus>()?;

    let details = api.details.unwrap_or_default();
    let categories = details
        .category
        .filter(|c| !c.trim().is_empty())
        .map(|c| vec![c])
        .unwrap_or_default();
    let (counterparty_name, counterparty_type) = match details.counterparty {
        Some(cp) => (cp.name, cp.counterparty_type),
        None => (None, None),
    };
    let links = api.links.unwrap_or_default();

    Ok(Transaction {
        id: api.id,
        user_id: user_id.to_string(),
        provider: TransactionProvider::Teller,
        account_id: api.account_id,
        institution_id: Some(institution_id.to_string()),
        amount,
        date,
        description: api.description,
        categories,
        currency: None,
        status,
        transaction_type: api.transaction_type,
        running_balance,
        processing_status: details.processing_status,
        counterparty_name,
        counterparty_type,
        self_link: links.self_link,
        account_link: links.account,
    })
}
