//! Domain types representing budget categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, NamedEntity};

/// Default category names seeded when a period has no categories yet.
pub const DEFAULT_CATEGORY_NAMES: &[&str] = &[
    "Groceries",
    "Transport",
    "Utilities",
    "Entertainment",
    "Health",
    "Other",
];

/// A named spending bucket with a limit and a running total, scoped to one
/// period.
///
/// `spent` is the incrementally maintained counter updated only through the
/// expense ledger's atomic commits. It is intended to equal the sum of all
/// expenses ever posted against the category, but can diverge from the
/// recomputed aggregate (expense deletion does not reverse it).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategory {
    pub id: Uuid,
    pub family_id: String,
    pub period_id: Uuid,
    pub name: String,
    pub limit: f64,
    pub spent: f64,
    pub created_at: DateTime<Utc>,
}

impl BudgetCategory {
    pub fn new(
        family_id: impl Into<String>,
        period_id: Uuid,
        name: impl Into<String>,
        limit: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_id: family_id.into(),
            period_id,
            name: name.into(),
            limit: limit.max(0.0),
            spent: 0.0,
            created_at: Utc::now(),
        }
    }
}

impl Identifiable for BudgetCategory {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for BudgetCategory {
    fn name(&self) -> &str {
        &self.name
    }
}
