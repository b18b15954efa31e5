use async_trait::async_trait;

use super::transactions_model::Transaction;
use crate::errors::Result;
use crate::utils::time_utils::MonthYear;

/// Trait for transaction repository operations
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Inserts or refreshes every transaction in a single database transaction.
    /// Either all rows are written or none are.
    async fn upsert_many(&self, transactions: Vec<Transaction>) -> Result<usize>;

    fn list_for_month(&self, user_id: &str, month: MonthYear) -> Result<Vec<Transaction>>;

    /// Sum of amounts in the month tagged with `category`.
    fn sum_for_category(&self, user_id: &str, month: MonthYear, category: &str) -> Result<f64>;

    /// Sum of amounts in the month carrying none of `excluded`.
    fn sum_excluding_categories(
        &self,
        user_id: &str,
        month: MonthYear,
        excluded: &[String],
    ) -> Result<f64>;
}
