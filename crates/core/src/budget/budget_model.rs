//! Monthly budget domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::time_utils::MonthYear;

/// A user's budget header for one month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub id: String,
    pub user_id: String,
    pub month_year: MonthYear,
    pub total_spent: f64,
    pub starting_balance: f64,
    pub income: f64,
    pub saved_amount: f64,
    pub invested: f64,
    pub fixed_expenses: f64,
    pub saving_target_percentage: f64,
    /// Bumped on every write; used to detect concurrent updates.
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMonthlySummary {
    pub id: Option<String>,
    pub user_id: String,
    pub month_year: MonthYear,
    pub starting_balance: f64,
    pub income: f64,
    pub fixed_expenses: f64,
    pub saving_target_percentage: f64,
}

/// One spending category within a monthly summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudgetCategory {
    pub id: String,
    pub user_id: String,
    pub monthly_summary_id: String,
    pub month_year: MonthYear,
    pub category: String,
    pub budget: f64,
    pub total_spent: f64,
    pub daily_allowance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMonthlyBudgetCategory {
    pub id: Option<String>,
    pub monthly_summary_id: String,
    pub category: String,
    pub budget: f64,
}

/// Freshly computed figures for one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAllocation {
    pub category_id: String,
    pub category: String,
    pub total_spent: f64,
    pub daily_allowance: f64,
}

/// Everything a daily-balance run writes, applied atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBalanceUpdate {
    pub summary_id: String,
    /// The summary version the figures were computed from.
    pub expected_version: i32,
    pub total_spent: f64,
    pub categories: Vec<CategoryAllocation>,
}

/// Outcome of a daily-balance run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyBalanceReport {
    pub summary_id: String,
    pub month_year: MonthYear,
    pub days_into_month: u32,
    pub total_spent: f64,
    pub redistributed: bool,
    pub categories: Vec<CategoryAllocation>,
}
