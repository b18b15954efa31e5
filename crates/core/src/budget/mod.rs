//! Budget module - daily allowance computation and its persistence contract.

mod allocation;
mod budget_model;
mod budget_service;
mod budget_traits;


pub use allocation::{allocate, daily_allowance, redistribute, AllocationOutcome, CategorySpend};
pub use budget_model::{
    CategoryAllocation, DailyBalanceReport, DailyBalanceUpdate, MonthlyBudgetCategory,
    MonthlySummary, NewMonthlyBudgetCategory, NewMonthlySummary,
};
pub use budget_service::BudgetService;
pub use budget_traits::{BudgetRepositoryTrait, BudgetServiceTrait};
