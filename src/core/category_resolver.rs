//! Name-based category resolution across a family's periods.

use chrono::Utc;
use uuid::Uuid;

use crate::core::period_resolver::{most_recent_period, resolve_active_period};
use crate::domain::{BudgetCategory, BudgetPeriod, NamedEntity, DEFAULT_CATEGORY_NAMES};
use crate::errors::{BudgetError, Result};
use crate::storage::BudgetStore;

/// A category located by name, together with the period it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCategory {
    pub category: BudgetCategory,
    pub period_id: Uuid,
}

/// Finds `category_name` (exact, case-sensitive) for a family.
///
/// Search order: the active period's categories, then the most-recent
/// fallback period, then an exhaustive scan over every period the family
/// has, archived included, in store enumeration order. Names are not unique
/// across periods, so the exhaustive stage deliberately keeps first-match-
/// wins semantics.
pub fn resolve_category(
    store: &dyn BudgetStore,
    family_id: &str,
    category_name: &str,
) -> Result<ResolvedCategory> {
    let periods = store.periods_for_family(family_id)?;
    let today = Utc::now().date_naive();

    let mut searched: Vec<Uuid> = Vec::new();
    if let Some(active) = resolve_active_period(&periods, today) {
        if let Some(found) = find_in_period(store, active, category_name)? {
            return Ok(found);
        }
        searched.push(active.id);
    }
    if let Some(recent) = most_recent_period(&periods) {
        if !searched.contains(&recent.id) {
            if let Some(found) = find_in_period(store, recent, category_name)? {
                return Ok(found);
            }
        }
    }
    // Exhaustive last resort: walk every period the family has, archived
    // included, in ascending creation order. Names are not unique, so the
    // first match along this traversal wins.
    let mut ordered: Vec<&BudgetPeriod> = periods.iter().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    for period in ordered {
        if let Some(found) = find_in_period(store, period, category_name)? {
            return Ok(found);
        }
    }
    // Categories stranded by hard-deleted periods have no period left to
    // reach them through; check them last, in enumeration order.
    for category in store.categories_for_family(family_id)? {
        if category.name() == category_name
            && !periods.iter().any(|period| period.id == category.period_id)
        {
            return Ok(ResolvedCategory {
                period_id: category.period_id,
                category,
            });
        }
    }
    Err(BudgetError::CategoryNotFound(category_name.to_string()))
}

fn find_in_period(
    store: &dyn BudgetStore,
    period: &BudgetPeriod,
    category_name: &str,
) -> Result<Option<ResolvedCategory>> {
    let found = store
        .categories_for_period(period.id)?
        .into_iter()
        .find(|category| category.name() == category_name)
        .map(|category| ResolvedCategory {
            category,
            period_id: period.id,
        });
    Ok(found)
}

/// Seeds the default category set into a period, skipping names that
/// already exist there. Safe to call repeatedly; returns how many
/// categories were created.
pub fn initialize_default_categories(
    store: &dyn BudgetStore,
    family_id: &str,
    period_id: Uuid,
    default_limit: f64,
) -> Result<usize> {
    let existing = store.categories_for_period(period_id)?;
    let mut created = 0;
    for name in DEFAULT_CATEGORY_NAMES {
        if existing.iter().any(|category| category.name == *name) {
            continue;
        }
        store.insert_category(BudgetCategory::new(
            family_id,
            period_id,
            *name,
            default_limit,
        ))?;
        created += 1;
    }
    Ok(created)
}
