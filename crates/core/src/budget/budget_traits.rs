use async_trait::async_trait;
use chrono::NaiveDate;

use super::budget_model::{
    DailyBalanceReport, DailyBalanceUpdate, MonthlyBudgetCategory, MonthlySummary,
    NewMonthlyBudgetCategory, NewMonthlySummary,
};
use crate::errors::Result;
use crate::utils::time_utils::MonthYear;

/// Trait for budget repository operations
#[async_trait]
pub trait BudgetRepositoryTrait: Send + Sync {
    fn get_summary(&self, user_id: &str, month: MonthYear) -> Result<Option<MonthlySummary>>;
    fn list_categories(&self, summary_id: &str) -> Result<Vec<MonthlyBudgetCategory>>;
    async fn create_summary(&self, new_summary: NewMonthlySummary) -> Result<MonthlySummary>;
    async fn create_category(
        &self,
        new_category: NewMonthlyBudgetCategory,
    ) -> Result<MonthlyBudgetCategory>;
    /// Writes every category and the summary total in one transaction.
    ///
    /// Fails with `ConcurrentModification` when the summary's version no
    /// longer matches `update.expected_version`.
    async fn apply_daily_balance(&self, update: DailyBalanceUpdate) -> Result<MonthlySummary>;
}

/// Trait for budget service operations
#[async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    /// Recomputes allowances using today's day of month.
    async fn process_daily_balance(
        &self,
        user_id: &str,
        month: MonthYear,
    ) -> Result<DailyBalanceReport>;

    /// Recomputes allowances as of `today`.
    async fn process_daily_balance_on(
        &self,
        user_id: &str,
        month: MonthYear,
        today: NaiveDate,
    ) -> Result<DailyBalanceReport>;
}
