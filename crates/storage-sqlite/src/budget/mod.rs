//! SQLite storage for monthly summaries and their budget categories.

mod model;
mod repository;

pub use model::{MonthlyBudgetCategoryDB, MonthlySummaryDB};
pub use repository::BudgetRepository;
