//! Pure resolution of the active budget period.

use chrono::NaiveDate;

use crate::domain::BudgetPeriod;

/// Selects the single active period for `today`, if any.
///
/// Archived periods never qualify. Overlapping non-archived periods are
/// legal; ties are broken by most recent start date, then most recent
/// creation instant, so exactly one period wins. An empty result means the
/// family has no active budget.
pub fn resolve_active_period(periods: &[BudgetPeriod], today: NaiveDate) -> Option<&BudgetPeriod> {
    let mut candidates: Vec<&BudgetPeriod> = periods
        .iter()
        .filter(|period| !period.is_archived && period.contains(today))
        .collect();
    candidates.sort_by(|a, b| {
        b.start_date
            .cmp(&a.start_date)
            .then(b.created_at.cmp(&a.created_at))
    });
    candidates.first().copied()
}

/// Fallback used only when posting expenses: the most recent period by end
/// date (then creation instant), preferring non-archived periods and
/// considering archived ones only when no other exists. Never surfaced as
/// "the active period".
pub fn most_recent_period(periods: &[BudgetPeriod]) -> Option<&BudgetPeriod> {
    fn most_recent<'a>(mut subset: Vec<&'a BudgetPeriod>) -> Option<&'a BudgetPeriod> {
        subset.sort_by(|a, b| {
            b.end_date
                .cmp(&a.end_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        subset.first().copied()
    }
    let live: Vec<&BudgetPeriod> = periods.iter().filter(|p| !p.is_archived).collect();
    if !live.is_empty() {
        return most_recent(live);
    }
    most_recent(periods.iter().collect())
}
