use async_trait::async_trait;

use super::accounts_model::{
    Institution, NewInstitution, NewPlaidToken, PlaidAccount, PlaidToken, TellerAccount,
};
use crate::errors::Result;

/// Trait for Teller institution repository operations
#[async_trait]
pub trait InstitutionRepositoryTrait: Send + Sync {
    fn find_by_access_token(&self, user_id: &str, access_token: &str)
        -> Result<Option<Institution>>;
    async fn create(&self, new_institution: NewInstitution) -> Result<Institution>;
}

/// Trait for Teller account repository operations
#[async_trait]
pub trait TellerAccountRepositoryTrait: Send + Sync {
    fn get_by_id(&self, account_id: &str) -> Result<Option<TellerAccount>>;
    fn list_by_user(&self, user_id: &str) -> Result<Vec<TellerAccount>>;
    /// Inserts the account or refreshes its mutable fields.
    async fn upsert(&self, account: TellerAccount) -> Result<TellerAccount>;
}

/// Trait for Plaid token repository operations
#[async_trait]
pub trait PlaidTokenRepositoryTrait: Send + Sync {
    fn get_by_access_token(&self, access_token: &str) -> Result<Option<PlaidToken>>;
    async fn create(&self, new_token: NewPlaidToken) -> Result<PlaidToken>;
    /// Flips `is_processed` to true. Fails with `TokenAlreadyProcessed` if
    /// another caller got there first.
    async fn mark_processed(&self, token_id: &str) -> Result<()>;
}

/// Trait for Plaid account repository operations
#[async_trait]
pub trait PlaidAccountRepositoryTrait: Send + Sync {
    fn list_ids_by_user(&self, user_id: &str) -> Result<Vec<String>>;
    /// Access token of the Plaid item the account belongs to, scoped to its owner.
    fn get_access_token(&self, account_id: &str, user_id: &str) -> Result<Option<String>>;
    fn all_accounts_synced(&self, user_id: &str) -> Result<bool>;
    /// Upserts every account in one transaction.
    async fn upsert_many(&self, accounts: Vec<PlaidAccount>) -> Result<usize>;
    async fn mark_synced(&self, account_id: &str) -> Result<()>;
}
