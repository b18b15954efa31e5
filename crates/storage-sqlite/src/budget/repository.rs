use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::sync::Arc;
use uuid::Uuid;

use watson_core::budget::{
    BudgetRepositoryTrait, DailyBalanceUpdate, MonthlyBudgetCategory, MonthlySummary,
    NewMonthlyBudgetCategory, NewMonthlySummary,
};
use watson_core::errors::DatabaseError;
use watson_core::{Error, MonthYear, Result};

use super::model::{MonthlyBudgetCategoryDB, MonthlySummaryDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{monthly_budget_spend_category, monthly_summary};

pub struct BudgetRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BudgetRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_summary(conn: &mut SqliteConnection, summary_id: &str) -> Result<Option<MonthlySummary>> {
    let row = monthly_summary::table
        .find(summary_id)
        .select(MonthlySummaryDB::as_select())
        .first::<MonthlySummaryDB>(conn)
        .optional()
        .map_err(StorageError::from)?;
    row.map(|r| MonthlySummary::try_from(r).map_err(Error::from))
        .transpose()
}

#[async_trait]
impl BudgetRepositoryTrait for BudgetRepository {
    fn get_summary(&self, user_id: &str, month: MonthYear) -> Result<Option<MonthlySummary>> {
        let mut conn = get_connection(&self.pool)?;
        let row = monthly_summary::table
            .filter(monthly_summary::user_id.eq(user_id))
            .filter(monthly_summary::month_year.eq(month.code()))
            .select(MonthlySummaryDB::as_select())
            .first::<MonthlySummaryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(|r| MonthlySummary::try_from(r).map_err(Error::from))
            .transpose()
    }

    fn list_categories(&self, summary_id: &str) -> Result<Vec<MonthlyBudgetCategory>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = monthly_budget_spend_category::table
            .filter(monthly_budget_spend_category::monthly_summary_id.eq(summary_id))
            .order(monthly_budget_spend_category::category.asc())
            .select(MonthlyBudgetCategoryDB::as_select())
            .load::<MonthlyBudgetCategoryDB>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter()
            .map(|r| MonthlyBudgetCategory::try_from(r).map_err(Error::from))
            .collect()
    }

    async fn create_summary(&self, new_summary: NewMonthlySummary) -> Result<MonthlySummary> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MonthlySummary> {
                let now = chrono::Utc::now().naive_utc();
                let row = MonthlySummaryDB {
                    id: new_summary.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: new_summary.user_id,
                    month_year: new_summary.month_year.code(),
                    total_spent: 0.0,
                    starting_balance: new_summary.starting_balance,
                    income: new_summary.income,
                    saved_amount: 0.0,
                    invested: 0.0,
                    fixed_expenses: new_summary.fixed_expenses,
                    saving_target_percentage: new_summary.saving_target_percentage,
                    version: 0,
                    created_at: now,
                    updated_at: now,
                };
                let saved = diesel::insert_into(monthly_summary::table)
                    .values(&row)
                    .returning(MonthlySummaryDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(MonthlySummary::try_from(saved)?)
            })
            .await
    }

    async fn create_category(
        &self,
        new_category: NewMonthlyBudgetCategory,
    ) -> Result<MonthlyBudgetCategory> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MonthlyBudgetCategory> {
                let summary = load_summary(conn, &new_category.monthly_summary_id)?
                    .ok_or_else(|| {
                        DatabaseError::NotFound(format!(
                            "Monthly summary {}",
                            new_category.monthly_summary_id
                        ))
                    })?;
                let now = chrono::Utc::now().naive_utc();
                let row = MonthlyBudgetCategoryDB {
                    id: new_category.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                    user_id: summary.user_id,
                    monthly_summary_id: summary.id,
                    month_year: summary.month_year.code(),
                    category: new_category.category,
                    budget: new_category.budget,
                    total_spent: 0.0,
                    daily_allowance: 0.0,
                    created_at: now,
                    updated_at: now,
                };
                let saved = diesel::insert_into(monthly_budget_spend_category::table)
                    .values(&row)
                    .returning(MonthlyBudgetCategoryDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(MonthlyBudgetCategory::try_from(saved)?)
            })
            .await
    }

    async fn apply_daily_balance(&self, update: DailyBalanceUpdate) -> Result<MonthlySummary> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<MonthlySummary> {
                let now = chrono::Utc::now().naive_utc();

                // Version guard first: a stale run must not touch any row.
                let bumped = diesel::update(
                    monthly_summary::table
                        .filter(monthly_summary::id.eq(&update.summary_id))
                        .filter(monthly_summary::version.eq(update.expected_version)),
                )
                .set((
                    monthly_summary::total_spent.eq(update.total_spent),
                    monthly_summary::version.eq(monthly_summary::version + 1),
                    monthly_summary::updated_at.eq(now),
                ))
                .execute(conn)
                .map_err(StorageError::from)?;

                if bumped == 0 {
                    return match load_summary(conn, &update.summary_id)? {
                        Some(_) => Err(DatabaseError::ConcurrentModification(
                            update.summary_id.clone(),
                        )
                        .into()),
                        None => Err(DatabaseError::NotFound(format!(
                            "Monthly summary {}",
                            update.summary_id
                        ))
                        .into()),
                    };
                }

                for allocation in &update.categories {
                    let updated = diesel::update(
                        monthly_budget_spend_category::table
                            .filter(monthly_budget_spend_category::id.eq(&allocation.category_id))
                            .filter(
                                monthly_budget_spend_category::monthly_summary_id
                                    .eq(&update.summary_id),
                            ),
                    )
                    .set((
                        monthly_budget_spend_category::total_spent.eq(allocation.total_spent),
                        monthly_budget_spend_category::daily_allowance
                            .eq(allocation.daily_allowance),
                        monthly_budget_spend_category::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                    if updated == 0 {
                        return Err(DatabaseError::NotFound(format!(
                            "Budget category {}",
                            allocation.category_id
                        ))
                        .into());
                    }
                }

                load_summary(conn, &update.summary_id)?.ok_or_else(|| {
                    DatabaseError::NotFound(format!("Monthly summary {}", update.summary_id))
                        .into()
                })
            })
            .await
    }
}
