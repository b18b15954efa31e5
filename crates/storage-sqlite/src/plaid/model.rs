//! Database models for Plaid items and accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use watson_core::accounts::{PlaidAccount, PlaidToken};

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::plaid_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlaidTokenDB {
    pub id: String,
    pub user_id: String,
    pub access_token: String,
    pub item_id: String,
    pub is_processed: bool,
    pub created_at: NaiveDateTime,
}

impl From<PlaidTokenDB> for PlaidToken {
    fn from(db: PlaidTokenDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            access_token: db.access_token,
            item_id: db.item_id,
            is_processed: db.is_processed,
            created_at: db.created_at,
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::plaid_accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PlaidAccountDB {
    pub id: String,
    pub user_id: String,
    pub plaid_token_id: String,
    pub available_balance: f64,
    pub current_balance: f64,
    pub iso_currency_code: Option<String>,
    pub name: String,
    pub official_name: Option<String>,
    pub account_type: String,
    pub account_subtype: Option<String>,
    pub is_processed: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<PlaidAccountDB> for PlaidAccount {
    fn from(db: PlaidAccountDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            plaid_token_id: db.plaid_token_id,
            available_balance: db.available_balance,
            current_balance: db.current_balance,
            currency: db.iso_currency_code,
            name: db.name,
            official_name: db.official_name,
            account_type: db.account_type,
            subtype: db.account_subtype,
            is_synced: db.is_processed,
        }
    }
}

impl PlaidAccountDB {
    pub fn from_domain(account: PlaidAccount, now: NaiveDateTime) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            plaid_token_id: account.plaid_token_id,
            available_balance: account.available_balance,
            current_balance: account.current_balance,
            iso_currency_code: account.currency,
            name: account.name,
            official_name: account.official_name,
            account_type: account.account_type,
            account_subtype: account.subtype,
            is_processed: account.is_synced,
            created_at: now,
            updated_at: now,
        }
    }
}
