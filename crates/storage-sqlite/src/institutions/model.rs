//! Database models for Teller institutions.

use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::teller_institutions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InstitutionDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub teller_id: String,
    pub access_token: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<InstitutionDB> for watson_core::accounts::Institution {
    fn from(db: InstitutionDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            name: db.name,
            teller_id: db.teller_id,
            access_token: db.access_token,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}
