//! Stateless spend recomputation over raw expense and shopping records.
//!
//! Nothing in this module reads a category's stored `spent` counter: the
//! dashboard recomputes totals from scratch so counter drift (deleted
//! expenses, legacy renames) stays observable instead of compounding.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BudgetCategory, BudgetPeriod, DirectExpense, ShoppingItem};

/// Color level for percentage-used display.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SpendLevel {
    Normal,
    Warning,
    Critical,
}

impl SpendLevel {
    pub fn for_percentage(percentage_used: f64) -> Self {
        if percentage_used >= 100.0 {
            SpendLevel::Critical
        } else if percentage_used >= 80.0 {
            SpendLevel::Warning
        } else {
            SpendLevel::Normal
        }
    }
}

/// One dashboard row, recomputed from raw records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySummary {
    pub category_id: Uuid,
    pub name: String,
    pub limit: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage_used: f64,
    pub level: SpendLevel,
}

/// Aggregate dashboard statistics for one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeriodSummary {
    pub period_id: Uuid,
    pub total_limit: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub percentage_used: f64,
    pub per_category: Vec<CategorySummary>,
}

/// Clamps corrupted numeric input (NaN, infinities, negatives) to zero so
/// it never reaches display code or further arithmetic.
pub fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}

/// Recomputes a category's spend inside the period's inclusive date window.
///
/// Direct expenses match by the captured category id, or by name for legacy
/// records without one; shopping items count only once bought, at
/// `estimated_price * quantity`.
pub fn compute_category_spend(
    category: &BudgetCategory,
    period: &BudgetPeriod,
    direct_expenses: &[DirectExpense],
    shopping_items: &[ShoppingItem],
) -> f64 {
    let expense_total: f64 = direct_expenses
        .iter()
        .filter(|expense| expense.belongs_to(category.id, &category.name))
        .filter(|expense| period.contains(expense.created_at.date_naive()))
        .map(|expense| sanitize_amount(expense.amount))
        .sum();
    let item_total: f64 = shopping_items
        .iter()
        .filter(|item| item.is_bought && item.category_name == category.name)
        .filter(|item| period.contains(item.created_at.date_naive()))
        .map(|item| sanitize_amount(item.cost()))
        .sum();
    expense_total + item_total
}

/// Percentage of `limit` consumed by `spent`; zero-limit categories report
/// zero rather than dividing by zero.
pub fn percentage_used(spent: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        0.0
    } else {
        (spent / limit) * 100.0
    }
}

/// Builds the period dashboard by summing the per-category recomputation
/// across all of the period's categories.
pub fn summarize_period(
    period: &BudgetPeriod,
    categories: &[BudgetCategory],
    direct_expenses: &[DirectExpense],
    shopping_items: &[ShoppingItem],
) -> PeriodSummary {
    let per_category: Vec<CategorySummary> = categories
        .iter()
        .map(|category| {
            let limit = sanitize_amount(category.limit);
            let spent = compute_category_spend(category, period, direct_expenses, shopping_items);
            let used = percentage_used(spent, limit);
            CategorySummary {
                category_id: category.id,
                name: category.name.clone(),
                limit,
                spent,
                remaining: limit - spent,
                percentage_used: used,
                level: SpendLevel::for_percentage(used),
            }
        })
        .collect();
    let total_limit: f64 = per_category.iter().map(|row| row.limit).sum();
    let total_spent: f64 = per_category.iter().map(|row| row.spent).sum();
    PeriodSummary {
        period_id: period.id,
        total_limit,
        total_spent,
        total_remaining: total_limit - total_spent,
        percentage_used: percentage_used(total_spent, total_limit),
        per_category,
    }
}
