use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel::SqliteConnection;
use log::debug;
use std::sync::Arc;
use uuid::Uuid;

use watson_core::accounts::{
    NewPlaidToken, PlaidAccount, PlaidAccountRepositoryTrait, PlaidToken,
    PlaidTokenRepositoryTrait,
};
use watson_core::errors::{DatabaseError, JobError};
use watson_core::Result;

use super::model::{PlaidAccountDB, PlaidTokenDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{plaid_accounts, plaid_tokens};

pub struct PlaidTokenRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PlaidTokenRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PlaidTokenRepositoryTrait for PlaidTokenRepository {
    fn get_by_access_token(&self, access_token: &str) -> Result<Option<PlaidToken>> {
        let mut conn = get_connection(&self.pool)?;
        let row = plaid_tokens::table
            .filter(plaid_tokens::access_token.eq(access_token))
            .select(PlaidTokenDB::as_select())
            .first::<PlaidTokenDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(PlaidToken::from))
    }

    async fn create(&self, new_token: NewPlaidToken) -> Result<PlaidToken> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PlaidToken> {
                let row = PlaidTokenDB {
                    id: Uuid::new_v4().to_string(),
                    user_id: new_token.user_id,
                    access_token: new_token.access_token,
                    item_id: new_token.item_id,
                    is_processed: false,
                    created_at: chrono::Utc::now().naive_utc(),
                };
                let saved = diesel::insert_into(plaid_tokens::table)
                    .values(&row)
                    .returning(PlaidTokenDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(PlaidToken::from(saved))
            })
            .await
    }

    async fn mark_processed(&self, token_id: &str) -> Result<()> {
        let token_id = token_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                // Check-and-set: only one caller can flip the flag.
                let updated = diesel::update(
                    plaid_tokens::table
                        .filter(plaid_tokens::id.eq(&token_id))
                        .filter(plaid_tokens::is_processed.eq(false)),
                )
                .set(plaid_tokens::is_processed.eq(true))
                .execute(conn)
                .map_err(StorageError::from)?;

                if updated == 1 {
                    return Ok(());
                }

                let exists = plaid_tokens::table
                    .find(&token_id)
                    .select(plaid_tokens::id)
                    .first::<String>(conn)
                    .optional()
                    .map_err(StorageError::from)?
                    .is_some();
                if exists {
                    Err(JobError::TokenAlreadyProcessed(token_id).into())
                } else {
                    Err(DatabaseError::NotFound(format!("Plaid token {}", token_id)).into())
                }
            })
            .await
    }
}

pub struct PlaidAccountRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PlaidAccountRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PlaidAccountRepositoryTrait for PlaidAccountRepository {
    fn list_ids_by_user(&self, user_id: &str) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        let ids = plaid_accounts::table
            .filter(plaid_accounts::user_id.eq(user_id))
            .order(plaid_accounts::id.asc())
            .select(plaid_accounts::id)
            .load::<String>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(ids)
    }

    fn get_access_token(&self, account_id: &str, user_id: &str) -> Result<Option<String>> {
        let mut conn = get_connection(&self.pool)?;
        let token = plaid_accounts::table
            .inner_join(plaid_tokens::table)
            .filter(plaid_accounts::id.eq(account_id))
            .filter(plaid_accounts::user_id.eq(user_id))
            .select(plaid_tokens::access_token)
            .first::<String>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(token)
    }

    fn all_accounts_synced(&self, user_id: &str) -> Result<bool> {
        let mut conn = get_connection(&self.pool)?;
        let pending: i64 = plaid_accounts::table
            .filter(plaid_accounts::user_id.eq(user_id))
            .filter(plaid_accounts::is_processed.eq(false))
            .select(count_star())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Ok(pending == 0)
    }

    async fn upsert_many(&self, accounts: Vec<PlaidAccount>) -> Result<usize> {
        if accounts.is_empty() {
            return Ok(0);
        }
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let now = chrono::Utc::now().naive_utc();
                let mut written = 0;
                for account in accounts {
                    let row = PlaidAccountDB::from_domain(account, now);
                    written += diesel::insert_into(plaid_accounts::table)
                        .values(&row)
                        .on_conflict(plaid_accounts::id)
                        .do_update()
                        .set((
                            plaid_accounts::available_balance
                                .eq(excluded(plaid_accounts::available_balance)),
                            plaid_accounts::current_balance
                                .eq(excluded(plaid_accounts::current_balance)),
                            plaid_accounts::iso_currency_code
                                .eq(excluded(plaid_accounts::iso_currency_code)),
                            plaid_accounts::name.eq(excluded(plaid_accounts::name)),
                            plaid_accounts::official_name
                                .eq(excluded(plaid_accounts::official_name)),
                            plaid_accounts::account_type
                                .eq(excluded(plaid_accounts::account_type)),
                            plaid_accounts::account_subtype
                                .eq(excluded(plaid_accounts::account_subtype)),
                            plaid_accounts::updated_at.eq(excluded(plaid_accounts::updated_at)),
                        ))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                debug!("Upserted {} Plaid accounts", written);
                Ok(written)
            })
            .await
    }

    async fn mark_synced(&self, account_id: &str) -> Result<()> {
        let account_id = account_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let updated = diesel::update(plaid_accounts::table.find(&account_id))
                    .set((
                        plaid_accounts::is_processed.eq(true),
                        plaid_accounts::updated_at.eq(chrono::Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if updated == 0 {
                    return Err(
                        DatabaseError::NotFound(format!("Plaid account {}", account_id)).into(),
                    );
                }
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;
    use watson_core::Error;

    fn plaid_account(id: &str, token_id: &str, name: &str) -> PlaidAccount {
        PlaidAccount {
            id: id.to_string(),
            user_id: "7".to_string(),
            plaid_token_id: token_id.to_string(),
            available_balance: 100.0,
            current_balance: 110.0,
            currency: Some("USD".to_string()),
            name: name.to_string(),
            official_name: None,
            account_type: "depository".to_string(),
            subtype: Some("checking".to_string()),
            is_synced: false,
        }
    }

    async fn token(repo: &PlaidTokenRepository) -> PlaidToken {
        repo.create(NewPlaidToken {
            user_id: "7".to_string(),
            access_token: "access-sandbox-1".to_string(),
            item_id: "item-1".to_string(),
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn token_can_only_be_processed_once() {
        let (pool, writer, _dir) = test_db();
        let repo = PlaidTokenRepository::new(pool, writer);
        let saved = token(&repo).await;
        assert!(!saved.is_processed);

        repo.mark_processed(&saved.id).await.unwrap();
        let err = repo.mark_processed(&saved.id).await.unwrap_err();
        assert!(matches!(err, Error::Job(JobError::TokenAlreadyProcessed(_))));

        let reloaded = repo.get_by_access_token("access-sandbox-1").unwrap().unwrap();
        assert!(reloaded.is_processed);

        let err = repo.mark_processed("missing").await.unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn accounts_sync_flags_and_token_lookup() {
        let (pool, writer, _dir) = test_db();
        let tokens = PlaidTokenRepository::new(pool.clone(), writer.clone());
        let saved = token(&tokens).await;
        let repo = PlaidAccountRepository::new(pool, writer);

        let written = repo
            .upsert_many(vec![
                plaid_account("acc-a", &saved.id, "Checking"),
                plaid_account("acc-b", &saved.id, "Savings"),
            ])
            .await
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(repo.list_ids_by_user("7").unwrap(), vec!["acc-a", "acc-b"]);
        assert_eq!(
            repo.get_access_token("acc-a", "7").unwrap().as_deref(),
            Some("access-sandbox-1")
        );
        assert!(repo.get_access_token("acc-a", "8").unwrap().is_none());

        assert!(!repo.all_accounts_synced("7").unwrap());
        repo.mark_synced("acc-a").await.unwrap();
        assert!(!repo.all_accounts_synced("7").unwrap());
        repo.mark_synced("acc-b").await.unwrap();
        assert!(repo.all_accounts_synced("7").unwrap());
        // A user with no accounts counts as synced.
        assert!(repo.all_accounts_synced("nobody").unwrap());
    }

    #[tokio::test]
    async fn upsert_many_is_all_or_nothing() {
        let (pool, writer, _dir) = test_db();
        let tokens = PlaidTokenRepository::new(pool.clone(), writer.clone());
        let saved = token(&tokens).await;
        let repo = PlaidAccountRepository::new(pool, writer);

        let result = repo
            .upsert_many(vec![
                plaid_account("acc-a", &saved.id, "Checking"),
                plaid_account("acc-b", "unknown-token", "Savings"),
            ])
            .await;
        assert!(result.is_err());
        assert!(repo.list_ids_by_user("7").unwrap().is_empty());
    }
}
