use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use watson_core::accounts::{Institution, InstitutionRepositoryTrait, NewInstitution};
use watson_core::Result;

use super::model::InstitutionDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::teller_institutions;

pub struct InstitutionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InstitutionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl InstitutionRepositoryTrait for InstitutionRepository {
    fn find_by_access_token(
        &self,
        user_id: &str,
        access_token: &str,
    ) -> Result<Option<Institution>> {
        let mut conn = get_connection(&self.pool)?;
        let row = teller_institutions::table
            .filter(teller_institutions::user_id.eq(user_id))
            .filter(teller_institutions::access_token.eq(access_token))
            .select(InstitutionDB::as_select())
            .first::<InstitutionDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(Institution::from))
    }

    async fn create(&self, new_institution: NewInstitution) -> Result<Institution> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Institution> {
                let now = chrono::Utc::now().naive_utc();
                let row = InstitutionDB {
                    id: new_institution
                        .id
                        .unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: new_institution.user_id,
                    name: new_institution.name,
                    teller_id: new_institution.teller_id,
                    access_token: new_institution.access_token,
                    created_at: now,
                    updated_at: now,
                };
                let saved = diesel::insert_into(teller_institutions::table)
                    .values(&row)
                    .returning(InstitutionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(Institution::from(saved))
            })
            .await
    }
}
