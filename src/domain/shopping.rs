//! Read-model of shopping list items owned by the shopping subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::Identifiable;

/// A shopping list item as the budget engine sees it.
///
/// The shopping subsystem owns item CRUD; this crate reads items for spend
/// aggregation and owns only the category-counter side effect of the bought
/// toggle. An empty `category_name` marks the item as unbudgeted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShoppingItem {
    pub id: Uuid,
    pub family_id: String,
    pub name: String,
    pub category_name: String,
    pub estimated_price: f64,
    pub quantity: u32,
    pub is_bought: bool,
    pub created_at: DateTime<Utc>,
}

impl ShoppingItem {
    pub fn new(
        family_id: impl Into<String>,
        name: impl Into<String>,
        category_name: impl Into<String>,
        estimated_price: f64,
        quantity: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            family_id: family_id.into(),
            name: name.into(),
            category_name: category_name.into(),
            estimated_price,
            quantity,
            is_bought: false,
            created_at: Utc::now(),
        }
    }

    /// What this item contributes to a category's spend once bought.
    pub fn cost(&self) -> f64 {
        self.estimated_price * self.quantity as f64
    }
}

impl Identifiable for ShoppingItem {
    fn id(&self) -> Uuid {
        self.id
    }
}
