use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{Date, Text};
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;

use watson_core::transactions::{Transaction, TransactionRepositoryTrait};
use watson_core::{MonthYear, Result};

use super::model::{AmountTotal, TransactionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::transactions;

pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    async fn upsert_many(&self, items: Vec<Transaction>) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let now = chrono::Utc::now().naive_utc();
                let mut written = 0;
                for tx in items {
                    let row = TransactionDB::from_domain(tx, now)?;
                    written += diesel::insert_into(transactions::table)
                        .values(&row)
                        .on_conflict(transactions::id)
                        .do_update()
                        .set((
                            transactions::amount.eq(excluded(transactions::amount)),
                            transactions::transaction_date
                                .eq(excluded(transactions::transaction_date)),
                            transactions::description.eq(excluded(transactions::description)),
                            transactions::category.eq(excluded(transactions::category)),
                            transactions::currency.eq(excluded(transactions::currency)),
                            transactions::status.eq(excluded(transactions::status)),
                            transactions::transaction_type
                                .eq(excluded(transactions::transaction_type)),
                            transactions::running_balance
                                .eq(excluded(transactions::running_balance)),
                            transactions::processing_status
                                .eq(excluded(transactions::processing_status)),
                            transactions::counterparty_name
                                .eq(excluded(transactions::counterparty_name)),
                            transactions::counterparty_type
                                .eq(excluded(transactions::counterparty_type)),
                            transactions::updated_at.eq(excluded(transactions::updated_at)),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                debug!("Upserted {} transactions", written);
                Ok(written)
            })
            .await
    }

    fn list_for_month(&self, user_id: &str, month: MonthYear) -> Result<Vec<Transaction>> {
        let mut conn = get_connection(&self.pool)?;
        let (start, end) = month.date_range();
        let rows = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .filter(transactions::transaction_date.ge(start))
            .filter(transactions::transaction_date.lt(end))
            .order((transactions::transaction_date.asc(), transactions::id.asc()))
            .select(TransactionDB::as_select())
            .load::<TransactionDB>(&mut conn)
            .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|row| Transaction::try_from(row).map_err(watson_core::Error::from))
            .collect()
    }

    fn sum_for_category(&self, user_id: &str, month: MonthYear, category: &str) -> Result<f64> {
        let mut conn = get_connection(&self.pool)?;
        let (start, end) = month.date_range();
        let row = sql_query(
            "SELECT COALESCE(SUM(t.amount), 0.0) AS total
             FROM transactions t
             WHERE t.user_id = ?
               AND t.transaction_date >= ?
               AND t.transaction_date < ?
               AND EXISTS (SELECT 1 FROM json_each(t.category) WHERE value = ?)",
        )
        .bind::<Text, _>(user_id)
        .bind::<Date, _>(start)
        .bind::<Date, _>(end)
        .bind::<Text, _>(category)
        .get_result::<AmountTotal>(&mut conn)
        .map_err(StorageError::from)?;
        Ok(row.total)
    }

    fn sum_excluding_categories(
        &self,
        user_id: &str,
        month: MonthYear,
        excluded_categories: &[String],
    ) -> Result<f64> {
        let mut conn = get_connection(&self.pool)?;
        let (start, end) = month.date_range();
        let excluded_json = serde_json::to_string(excluded_categories)?;
        let row = sql_query(
            "SELECT COALESCE(SUM(t.amount), 0.0) AS total
             FROM transactions t
             WHERE t.user_id = ?
               AND t.transaction_date >= ?
               AND t.transaction_date < ?
               AND NOT EXISTS (
                   SELECT 1 FROM json_each(t.category) c
                   WHERE c.value IN (SELECT value FROM json_each(?))
               )",
        )
        .bind::<Text, _>(user_id)
        .bind::<Date, _>(start)
        .bind::<Date, _>(end)
        .bind::<Text, _>(excluded_json)
        .get_result::<AmountTotal>(&mut conn)
        .map_err(StorageError::from)?;
        Ok(row.total)
    }
}
