//! Database model for Teller accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use watson_core::accounts::TellerAccount;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::teller_accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TellerAccountDB {
    pub id: String,
    pub user_id: String,
    pub teller_institution_id: String,
    pub enrollment_id: Option<String>,
    pub account_name: String,
    pub account_type: String,
    pub account_subtype: Option<String>,
    pub currency: Option<String>,
    pub last_four: Option<String>,
    pub status: Option<String>,
    pub institution_id: Option<String>,
    pub institution_name: Option<String>,
    pub self_link: Option<String>,
    pub details_link: Option<String>,
    pub balances_link: Option<String>,
    pub transactions_link: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<TellerAccountDB> for TellerAccount {
    fn from(db: TellerAccountDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            institution_id: db.teller_institution_id,
            enrollment_id: db.enrollment_id,
            name: db.account_name,
            account_type: db.account_type,
            subtype: db.account_subtype,
            currency: db.currency,
            last_four: db.last_four,
            status: db.status,
            institution_external_id: db.institution_id,
            institution_name: db.institution_name,
            self_link: db.self_link,
            details_link: db.details_link,
            balances_link: db.balances_link,
            transactions_link: db.transactions_link,
        }
    }
}

impl TellerAccountDB {
    pub fn from_domain(account: TellerAccount, now: NaiveDateTime) -> Self {
        Self {
            id: account.id,
            user_id: account.user_id,
            teller_institution_id: account.institution_id,
            enrollment_id: account.enrollment_id,
            account_name: account.name,
            account_type: account.account_type,
            account_subtype: account.subtype,
            currency: account.currency,
            last_four: account.last_four,
            status: account.status,
            institution_id: account.institution_external_id,
            institution_name: account.institution_name,
            self_link: account.self_link,
            details_link: account.details_link,
            balances_link: account.balances_link,
            transactions_link: account.transactions_link,
            created_at: now,
            updated_at: now,
        }
    }
}
