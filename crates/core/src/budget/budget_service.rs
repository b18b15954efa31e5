use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use dashmap::DashMap;
use log::{debug, info};
use tokio::sync::Mutex;

use super::allocation::{allocate, CategorySpend};
use super::budget_model::{CategoryAllocation, DailyBalanceReport, DailyBalanceUpdate};
use super::budget_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
use crate::constants::GENERAL_CATEGORY;
use crate::errors::{DatabaseError, Result};
use crate::transactions::TransactionRepositoryTrait;
use crate::utils::time_utils::{local_today, MonthYear};

/// Recomputes per-category spend and daily allowances for a user's month.
pub struct BudgetService {
    budget_repository: Arc<dyn BudgetRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    /// One lock per (user, month): runs for the same key never overlap.
    run_locks: DashMap<(String, MonthYear), Arc<Mutex<()>>>,
}

impl BudgetService {
    pub fn new(
        budget_repository: Arc<dyn BudgetRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    ) -> Self {
        Self {
            budget_repository,
            transaction_repository,
            run_locks: DashMap::new(),
        }
    }

    fn run_lock(&self, user_id: &str, month: MonthYear) -> Arc<Mutex<()>> {
        self.run_locks
            .entry((user_id.to_string(), month))
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the key's lock once no other run holds or awaits it.
    fn release_run_lock(&self, user_id: &str, month: MonthYear) {
        self.run_locks
            .remove_if(&(user_id.to_string(), month), |_, lock| {
                Arc::strong_count(lock) == 1
            });
    }

    #[cfg(test)]
    pub(crate) fn run_lock_count(&self) -> usize {
        self.run_locks.len()
    }

    async fn compute_and_store(
        &self,
        user_id: &str,
        month: MonthYear,
        today: NaiveDate,
    ) -> Result<DailyBalanceReport> {
        let summary = self
            .budget_repository
            .get_summary(user_id, month)?
            .ok_or_else(|| {
                DatabaseError::NotFound(format!(
                    "Monthly summary for user {} in {}",
                    user_id, month
                ))
            })?;
        let categories = self.budget_repository.list_categories(&summary.id)?;

        let mut excluded: Vec<String> = categories
            .iter()
            .filter(|c| c.category != GENERAL_CATEGORY)
            .map(|c| c.category.clone())
            .collect();
        excluded.sort();
        excluded.dedup();

        let mut spends = Vec::with_capacity(categories.len());
        for category in &categories {
            let spend = if category.category == GENERAL_CATEGORY {
                self.transaction_repository
                    .sum_excluding_categories(user_id, month, &excluded)?
            } else {
                self.transaction_repository
                    .sum_for_category(user_id, month, &category.category)?
            };
            debug!("{} spent {} in {}", category.category, spend, month);
            spends.push(CategorySpend {
                category: category.category.clone(),
                budget: category.budget,
                spend,
            });
        }

        let days_into_month = today.day();
        let outcome = allocate(&spends, days_into_month);
        let total_spent: f64 = spends.iter().map(|s| s.spend).sum();

        let allocations: Vec<CategoryAllocation> = categories
            .iter()
            .zip(spends.iter())
            .zip(outcome.allowances.iter())
            .map(|((category, spend), allowance)| CategoryAllocation {
                category_id: category.id.clone(),
                category: category.category.clone(),
                total_spent: spend.spend,
                daily_allowance: *allowance,
            })
            .collect();

        self.budget_repository
            .apply_daily_balance(DailyBalanceUpdate {
                summary_id: summary.id.clone(),
                expected_version: summary.version,
                total_spent,
                categories: allocations.clone(),
            })
            .await?;

        info!(
            "Daily balance for user {} in {}: {} categories, total spent {:.2}{}",
            user_id,
            month,
            allocations.len(),
            total_spent,
            if outcome.redistributed {
                ", deficit redistributed"
            } else {
                ""
            }
        );

        Ok(DailyBalanceReport {
            summary_id: summary.id,
            month_year: month,
            days_into_month,
            total_spent,
            redistributed: outcome.redistributed,
            categories: allocations,
        })
    }
}

#[async_trait]
impl BudgetServiceTrait for BudgetService {
    async fn process_daily_balance(
        &self,
        user_id: &str,
        month: MonthYear,
    ) -> Result<DailyBalanceReport> {
        let today = local_today();
        self.process_daily_balance_on(user_id, month, today).await
    }

    async fn process_daily_balance_on(
        &self,
        user_id: &str,
        month: MonthYear,
        today: NaiveDate,
    ) -> Result<DailyBalanceReport> {
        let lock = self.run_lock(user_id, month);
        let result = {
            let _guard = lock.lock().await;
            self.compute_and_store(user_id, month, today).await
        };
        drop(lock);
        self.release_run_lock(user_id, month);
        result
    }
}
