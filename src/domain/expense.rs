//! Domain types representing manually recorded expenses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;

/// A manually entered expense not derived from a shopping list purchase.
///
/// The category foreign key is captured at creation time. `category_name`
/// is kept alongside it as a legacy compatibility field: records imported
/// from older data carry only the name (`category_id = None`) and keep the
/// original name-keyed linkage, including its rename drift.
///
/// Immutable after creation except for deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DirectExpense {
    pub id: Uuid,
    pub family_id: String,
    pub description: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub category_name: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl DirectExpense {
    pub fn new(
        family_id: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        category_id: Uuid,
        category_name: impl Into<String>,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_id: family_id.into(),
            description: description.into(),
            amount,
            category_id: Some(category_id),
            category_name: category_name.into(),
            created_by: created_by.into(),
            created_at: Utc::now(),
        }
    }

    /// True when this expense belongs to `category_id`/`category_name`,
    /// preferring the stable id over the legacy name linkage.
    pub fn belongs_to(&self, category_id: Uuid, category_name: &str) -> bool {
        match self.category_id {
            Some(id) => id == category_id,
            None => self.category_name == category_name,
        }
    }
}

impl Identifiable for DirectExpense {
    fn id(&self) -> Uuid {
        self.id
    }
}
