//! In-memory versioned document store.
//!
//! Stands in for the managed remote store: mutex-guarded collections,
//! per-document revisions for optimistic concurrency, and snapshot-based
//! live queries. JSON snapshot import/export is provided for fixtures.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BudgetCategory, BudgetPeriod, DirectExpense, Identifiable, ShoppingItem};
use crate::errors::{BudgetError, Result};
use crate::storage::live::{SnapshotFn, Subscription, Watchers};
use crate::storage::{BudgetStore, CommitOutcome, CounterUpdate, Versioned};

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collections {
    periods: Vec<Versioned<BudgetPeriod>>,
    categories: Vec<Versioned<BudgetCategory>>,
    expenses: Vec<Versioned<DirectExpense>>,
    items: Vec<Versioned<ShoppingItem>>,
}

fn find_versioned<T: Identifiable + Clone>(
    entries: &[Versioned<T>],
    id: Uuid,
) -> Option<Versioned<T>> {
    entries.iter().find(|entry| entry.doc.id() == id).cloned()
}

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<Collections>,
    period_watchers: Arc<Mutex<Watchers<String, BudgetPeriod>>>,
    category_watchers: Arc<Mutex<Watchers<Uuid, BudgetCategory>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes all collections (with revisions) to JSON.
    pub fn export_snapshot(&self) -> Result<String> {
        let data = self.lock_data();
        Ok(serde_json::to_string_pretty(&*data)?)
    }

    /// Rebuilds a store from a snapshot produced by [`export_snapshot`].
    ///
    /// [`export_snapshot`]: MemoryStore::export_snapshot
    pub fn import_snapshot(json: &str) -> Result<Self> {
        let collections: Collections = serde_json::from_str(json)?;
        Ok(Self {
            data: Mutex::new(collections),
            ..Self::default()
        })
    }

    /// Seeds a shopping item. Item CRUD belongs to the shopping subsystem;
    /// this entry point exists so tests and fixtures can stock the store.
    pub fn insert_item(&self, item: ShoppingItem) -> Result<()> {
        self.lock_data().items.push(Versioned {
            revision: 1,
            doc: item,
        });
        Ok(())
    }

    fn lock_data(&self) -> MutexGuard<'_, Collections> {
        // Lock poisoning only happens if a writer panicked mid-mutation;
        // the collections are still structurally sound, so keep going.
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn snapshot_periods(&self, family_id: &str) -> Vec<BudgetPeriod> {
        let data = self.lock_data();
        data.periods
            .iter()
            .filter(|entry| entry.doc.family_id == family_id)
            .map(|entry| entry.doc.clone())
            .collect()
    }

    fn snapshot_categories(&self, period_id: Uuid) -> Vec<BudgetCategory> {
        let data = self.lock_data();
        data.categories
            .iter()
            .filter(|entry| entry.doc.period_id == period_id)
            .map(|entry| entry.doc.clone())
            .collect()
    }

    fn emit_periods(&self, family_id: &str) {
        let callbacks = {
            let watchers = match self.period_watchers.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            watchers.matching(&family_id.to_string())
        };
        if callbacks.is_empty() {
            return;
        }
        let snapshot = self.snapshot_periods(family_id);
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }

    fn emit_categories(&self, period_id: Uuid) {
        let callbacks = {
            let watchers = match self.category_watchers.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            watchers.matching(&period_id)
        };
        if callbacks.is_empty() {
            return;
        }
        let snapshot = self.snapshot_categories(period_id);
        for callback in callbacks {
            callback(snapshot.clone());
        }
    }
}

impl BudgetStore for MemoryStore {
    fn insert_period(&self, period: BudgetPeriod) -> Result<()> {
        let family_id = period.family_id.clone();
        self.lock_data().periods.push(Versioned {
            revision: 1,
            doc: period,
        });
        self.emit_periods(&family_id);
        Ok(())
    }

    fn archive_period(&self, period_id: Uuid) -> Result<()> {
        let family_id = {
            let mut data = self.lock_data();
            let entry = data
                .periods
                .iter_mut()
                .find(|entry| entry.doc.id == period_id)
                .ok_or_else(|| BudgetError::NotFound(format!("period {period_id}")))?;
            entry.doc.is_archived = true;
            entry.revision += 1;
            entry.doc.family_id.clone()
        };
        self.emit_periods(&family_id);
        Ok(())
    }

    fn delete_period(&self, period_id: Uuid) -> Result<()> {
        let family_id = {
            let mut data = self.lock_data();
            let position = data
                .periods
                .iter()
                .position(|entry| entry.doc.id == period_id)
                .ok_or_else(|| BudgetError::NotFound(format!("period {period_id}")))?;
            data.periods.remove(position).doc.family_id
        };
        self.emit_periods(&family_id);
        Ok(())
    }

    fn periods_for_family(&self, family_id: &str) -> Result<Vec<BudgetPeriod>> {
        let data = self.lock_data();
        Ok(data
            .periods
            .iter()
            .filter(|entry| entry.doc.family_id == family_id)
            .map(|entry| entry.doc.clone())
            .collect())
    }

    fn insert_category(&self, category: BudgetCategory) -> Result<()> {
        let period_id = category.period_id;
        self.lock_data().categories.push(Versioned {
            revision: 1,
            doc: category,
        });
        self.emit_categories(period_id);
        Ok(())
    }

    fn delete_category(&self, category_id: Uuid) -> Result<()> {
        let period_id = {
            let mut data = self.lock_data();
            let position = data
                .categories
                .iter()
                .position(|entry| entry.doc.id == category_id)
                .ok_or_else(|| BudgetError::NotFound(format!("category {category_id}")))?;
            data.categories.remove(position).doc.period_id
        };
        self.emit_categories(period_id);
        Ok(())
    }

    fn categories_for_period(&self, period_id: Uuid) -> Result<Vec<BudgetCategory>> {
        let data = self.lock_data();
        Ok(data
            .categories
            .iter()
            .filter(|entry| entry.doc.period_id == period_id)
            .map(|entry| entry.doc.clone())
            .collect())
    }

    fn categories_for_family(&self, family_id: &str) -> Result<Vec<BudgetCategory>> {
        let data = self.lock_data();
        Ok(data
            .categories
            .iter()
            .filter(|entry| entry.doc.family_id == family_id)
            .map(|entry| entry.doc.clone())
            .collect())
    }

    fn category(&self, category_id: Uuid) -> Result<Versioned<BudgetCategory>> {
        let data = self.lock_data();
        find_versioned(&data.categories, category_id)
            .ok_or_else(|| BudgetError::NotFound(format!("category {category_id}")))
    }

    fn expenses_for_family(&self, family_id: &str) -> Result<Vec<DirectExpense>> {
        let data = self.lock_data();
        Ok(data
            .expenses
            .iter()
            .filter(|entry| entry.doc.family_id == family_id)
            .map(|entry| entry.doc.clone())
            .collect())
    }

    fn delete_expense(&self, expense_id: Uuid) -> Result<()> {
        let mut data = self.lock_data();
        let position = data
            .expenses
            .iter()
            .position(|entry| entry.doc.id == expense_id)
            .ok_or_else(|| BudgetError::NotFound(format!("expense {expense_id}")))?;
        data.expenses.remove(position);
        Ok(())
    }

    fn items_for_family(&self, family_id: &str) -> Result<Vec<ShoppingItem>> {
        let data = self.lock_data();
        Ok(data
            .items
            .iter()
            .filter(|entry| entry.doc.family_id == family_id)
            .map(|entry| entry.doc.clone())
            .collect())
    }

    fn item(&self, item_id: Uuid) -> Result<Versioned<ShoppingItem>> {
        let data = self.lock_data();
        find_versioned(&data.items, item_id)
            .ok_or_else(|| BudgetError::NotFound(format!("item {item_id}")))
    }

    fn commit_expense(
        &self,
        update: CounterUpdate,
        expense: DirectExpense,
    ) -> Result<CommitOutcome> {
        let period_id = {
            let mut data = self.lock_data();
            let entry = data
                .categories
                .iter_mut()
                .find(|entry| entry.doc.id == update.category_id)
                .ok_or_else(|| {
                    BudgetError::NotFound(format!("category {}", update.category_id))
                })?;
            if entry.revision != update.expected_revision {
                return Ok(CommitOutcome::Conflict);
            }
            entry.doc.spent = update.new_spent;
            entry.revision += 1;
            let period_id = entry.doc.period_id;
            data.expenses.push(Versioned {
                revision: 1,
                doc: expense,
            });
            period_id
        };
        self.emit_categories(period_id);
        Ok(CommitOutcome::Committed)
    }

    fn commit_item_toggle(
        &self,
        item_id: Uuid,
        item_revision: u64,
        bought: bool,
        update: Option<CounterUpdate>,
    ) -> Result<CommitOutcome> {
        let touched_period = {
            let mut data = self.lock_data();
            let item_index = data
                .items
                .iter()
                .position(|entry| entry.doc.id == item_id)
                .ok_or_else(|| BudgetError::NotFound(format!("item {item_id}")))?;
            if data.items[item_index].revision != item_revision {
                return Ok(CommitOutcome::Conflict);
            }
            // Check the category revision before mutating anything so a
            // conflicted commit leaves no partial state.
            let category_index = match update {
                Some(update) => {
                    let index = data
                        .categories
                        .iter()
                        .position(|entry| entry.doc.id == update.category_id)
                        .ok_or_else(|| {
                            BudgetError::NotFound(format!("category {}", update.category_id))
                        })?;
                    if data.categories[index].revision != update.expected_revision {
                        return Ok(CommitOutcome::Conflict);
                    }
                    Some((index, update.new_spent))
                }
                None => None,
            };
            data.items[item_index].doc.is_bought = bought;
            data.items[item_index].revision += 1;
            category_index.map(|(index, new_spent)| {
                data.categories[index].doc.spent = new_spent;
                data.categories[index].revision += 1;
                data.categories[index].doc.period_id
            })
        };
        if let Some(period_id) = touched_period {
            self.emit_categories(period_id);
        }
        Ok(CommitOutcome::Committed)
    }

    fn subscribe_periods(
        &self,
        family_id: &str,
        callback: SnapshotFn<BudgetPeriod>,
    ) -> Subscription {
        let id = {
            let mut watchers = match self.period_watchers.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            watchers.register(family_id.to_string(), Arc::clone(&callback))
        };
        // Initial snapshot goes to the new subscriber only; nothing
        // changed for anyone already registered.
        callback(self.snapshot_periods(family_id));
        Subscription::for_watchers(&self.period_watchers, id)
    }

    fn subscribe_categories(
        &self,
        period_id: Uuid,
        callback: SnapshotFn<BudgetCategory>,
    ) -> Subscription {
        let id = {
            let mut watchers = match self.category_watchers.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            watchers.register(period_id, Arc::clone(&callback))
        };
        callback(self.snapshot_categories(period_id));
        Subscription::for_watchers(&self.category_watchers, id)
    }
}
