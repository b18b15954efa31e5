//! Database model for transactions.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use watson_core::transactions::{Transaction, TransactionProvider, TransactionStatus};

use crate::errors::StorageError;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub provider_type: String,
    pub account_id: String,
    pub institution_id: Option<String>,
    pub amount: f64,
    pub transaction_date: NaiveDate,
    pub description: String,
    /// JSON array of category tags.
    pub category: String,
    pub currency: Option<String>,
    pub status: String,
    pub transaction_type: Option<String>,
    pub running_balance: Option<f64>,
    pub processing_status: Option<String>,
    pub counterparty_name: Option<String>,
    pub counterparty_type: Option<String>,
    pub self_link: Option<String>,
    pub account_link: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TransactionDB {
    pub fn from_domain(tx: Transaction, now: NaiveDateTime) -> Result<Self, StorageError> {
        Ok(Self {
            category: serde_json::to_string(&tx.categories)?,
            id: tx.id,
            user_id: tx.user_id,
            provider_type: tx.provider.as_str().to_string(),
            account_id: tx.account_id,
            institution_id: tx.institution_id,
            amount: tx.amount,
            transaction_date: tx.date,
            description: tx.description,
            currency: tx.currency,
            status: tx.status.as_str().to_string(),
            transaction_type: tx.transaction_type,
            running_balance: tx.running_balance,
            processing_status: tx.processing_status,
            counterparty_name: tx.counterparty_name,
            counterparty_type: tx.counterparty_type,
            self_link: tx.self_link,
            account_link: tx.account_link,
            created_at: now,
            updated_at: now,
        })
    }
}

impl TryFrom<TransactionDB> for Transaction {
    type Error = StorageError;

    fn try_from(db: TransactionDB) -> Result<Self, Self::Error> {
        let provider = db
            .provider_type
            .parse::<TransactionProvider>()
            .map_err(StorageError::from)?;
        let status = db
            .status
            .parse::<TransactionStatus>()
            .map_err(StorageError::from)?;
        Ok(Self {
            categories: serde_json::from_str(&db.category)?,
            id: db.id,
            user_id: db.user_id,
            provider,
            account_id: db.account_id,
            institution_id: db.institution_id,
            amount: db.amount,
            date: db.transaction_date,
            description: db.description,
            currency: db.currency,
            status,
            transaction_type: db.transaction_type,
            running_balance: db.running_balance,
            processing_status: db.processing_status,
            counterparty_name: db.counterparty_name,
            counterparty_type: db.counterparty_type,
            self_link: db.self_link,
            account_link: db.account_link,
        })
    }
}

#[derive(QueryableByName, Debug)]
pub struct AmountTotal {
    #[diesel(sql_type = diesel::sql_types::Double)]
    pub total: f64,
}
