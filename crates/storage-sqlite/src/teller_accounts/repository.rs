use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use std::sync::Arc;

use watson_core::accounts::{TellerAccount, TellerAccountRepositoryTrait};
use watson_core::Result;

use super::model::TellerAccountDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::teller_accounts;
use crate::schema::teller_accounts::dsl::*;

pub struct TellerAccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TellerAccountRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl TellerAccountRepositoryTrait for TellerAccountRepository {
    fn get_by_id(&self, account_id: &str) -> Result<Option<TellerAccount>> {
        let mut conn = get_connection(&self.pool)?;
        let row = teller_accounts
            .find(account_id)
            .select(TellerAccountDB::as_select())
            .first::<TellerAccountDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(TellerAccount::from))
    }

    fn list_by_user(&self, owner: &str) -> Result<Vec<TellerAccount>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = teller_accounts
            .filter(user_id.eq(owner))
            .order(account_name.asc())
            .select(TellerAccountDB::as_select())
            .load::<TellerAccountDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(TellerAccount::from).collect())
    }

    async fn upsert(&self, account: TellerAccount) -> Result<TellerAccount> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<TellerAccount> {
                let row = TellerAccountDB::from_domain(account, chrono::Utc::now().naive_utc());
                let saved = diesel::insert_into(teller_accounts::table)
                    .values(&row)
                    .on_conflict(id)
                    .do_update()
                    .set((
                        account_name.eq(excluded(account_name)),
                        account_type.eq(excluded(account_type)),
                        account_subtype.eq(excluded(account_subtype)),
                        currency.eq(excluded(currency)),
                        last_four.eq(excluded(last_four)),
                        status.eq(excluded(status)),
                        institution_name.eq(excluded(institution_name)),
                        self_link.eq(excluded(self_link)),
                        details_link.eq(excluded(details_link)),
                        balances_link.eq(excluded(balances_link)),
                        transactions_link.eq(excluded(transactions_link)),
                        updated_at.eq(excluded(updated_at)),
                    ))
                    .returning(TellerAccountDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(TellerAccount::from(saved))
            })
            .await
    }
}
