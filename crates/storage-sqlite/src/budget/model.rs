//! Database models for monthly budgets.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use watson_core::budget::{MonthlyBudgetCategory, MonthlySummary};
use watson_core::MonthYear;

use crate::errors::StorageError;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::monthly_summary)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MonthlySummaryDB {
    pub id: String,
    pub user_id: String,
    pub month_year: i64,
    pub total_spent: f64,
    pub starting_balance: f64,
    pub income: f64,
    pub saved_amount: f64,
    pub invested: f64,
    pub fixed_expenses: f64,
    pub saving_target_percentage: f64,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<MonthlySummaryDB> for MonthlySummary {
    type Error = StorageError;

    fn try_from(db: MonthlySummaryDB) -> Result<Self, Self::Error> {
        Ok(Self {
            month_year: MonthYear::from_code(db.month_year)?,
            id: db.id,
            user_id: db.user_id,
            total_spent: db.total_spent,
            starting_balance: db.starting_balance,
            income: db.income,
            saved_amount: db.saved_amount,
            invested: db.invested,
            fixed_expenses: db.fixed_expenses,
            saving_target_percentage: db.saving_target_percentage,
            version: db.version,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::monthly_budget_spend_category)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MonthlyBudgetCategoryDB {
    pub id: String,
    pub user_id: String,
    pub monthly_summary_id: String,
    pub month_year: i64,
    pub category: String,
    pub budget: f64,
    pub total_spent: f64,
    pub daily_allowance: f64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<MonthlyBudgetCategoryDB> for MonthlyBudgetCategory {
    type Error = StorageError;

    fn try_from(db: MonthlyBudgetCategoryDB) -> Result<Self, Self::Error> {
        Ok(Self {
            month_year: MonthYear::from_code(db.month_year)?,
            id: db.id,
            user_id: db.user_id,
            monthly_summary_id: db.monthly_summary_id,
            category: db.category,
            budget: db.budget,
            total_spent: db.total_spent,
            daily_allowance: db.daily_allowance,
        })
    }
}
