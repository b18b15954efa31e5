//! Daily allowance arithmetic.
//!
//! A category's allowance is what it may still spend today: its budget spread
//! evenly over a 30-day month, accrued up to today, minus what was already
//! spent. When some categories are overspent and the rest hold enough slack,
//! the deficit is paid for by shrinking every positive allowance by the same
//! ratio and the overspent ones are reset to zero. Otherwise allowances are
//! left as computed so the deficit stays visible.

use crate::constants::BUDGET_DAYS_PER_MONTH;

/// One category's inputs to the allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpend {
    pub category: String,
    pub budget: f64,
    pub spend: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    /// Final allowances, in input order.
    pub allowances: Vec<f64>,
    pub redistributed: bool,
}

pub fn daily_allowance(budget: f64, spend: f64, days_into_month: u32) -> f64 {
    let daily_budget = budget / BUDGET_DAYS_PER_MONTH;
    daily_budget * f64::from(days_into_month) - spend
}

/// Covers negative allowances from positive ones in place.
///
/// Returns true when the redistribution was applied.
pub fn redistribute(allowances: &mut [f64]) -> bool {
    let mut total_negative = 0.0;
    let mut total_positive = 0.0;
    for allowance in allowances.iter() {
        if *allowance < 0.0 {
            total_negative += allowance;
        } else {
            total_positive += allowance;
        }
    }

    if !(total_negative < 0.0 && total_positive > 0.0) {
        return false;
    }
    let needed = -total_negative;
    if total_positive < needed {
        return false;
    }

    let ratio = needed / total_positive;
    for allowance in allowances.iter_mut() {
        if *allowance < 0.0 {
            *allowance = 0.0;
        } else {
            *allowance *= 1.0 - ratio;
        }
    }
    true
}

pub fn allocate(inputs: &[CategorySpend], days_into_month: u32) -> AllocationOutcome {
    let mut allowances: Vec<f64> = inputs
        .iter()
        .map(|c| daily_allowance(c.budget, c.spend, days_into_month))
        .collect();
    let redistributed = redistribute(&mut allowances);
    AllocationOutcome {
        allowances,
        redistributed,
    }
}
