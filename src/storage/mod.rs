pub mod live;
pub mod memory;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{BudgetCategory, BudgetPeriod, DirectExpense, ShoppingItem};
use crate::errors::Result;

pub use live::{SnapshotFn, Subscription};
pub use memory::MemoryStore;

/// A document paired with its optimistic-concurrency token. Revisions are
/// per-document and strictly increasing across writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Versioned<T> {
    pub revision: u64,
    pub doc: T,
}

/// Typed compare-and-swap on a category's running counter: the write
/// applies only if the document is still at `expected_revision`.
#[derive(Debug, Clone, Copy)]
pub struct CounterUpdate {
    pub category_id: Uuid,
    pub expected_revision: u64,
    pub new_spent: f64,
}

/// Result of a compare-and-swap commit. `Conflict` is transient: another
/// writer committed between this writer's read and write, and the caller is
/// expected to re-read and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum CommitOutcome {
    Committed,
    Conflict,
}

/// Abstraction over the remote document store's CRUD, transaction, and
/// live-query primitives, as consumed by the budget engine.
pub trait BudgetStore: Send + Sync {
    fn insert_period(&self, period: BudgetPeriod) -> Result<()>;
    fn archive_period(&self, period_id: Uuid) -> Result<()>;
    /// Hard delete; categories beneath the period stay behind, reachable
    /// only through the category resolver's exhaustive fallback.
    fn delete_period(&self, period_id: Uuid) -> Result<()>;
    fn periods_for_family(&self, family_id: &str) -> Result<Vec<BudgetPeriod>>;

    fn insert_category(&self, category: BudgetCategory) -> Result<()>;
    fn delete_category(&self, category_id: Uuid) -> Result<()>;
    fn categories_for_period(&self, period_id: Uuid) -> Result<Vec<BudgetCategory>>;
    /// Enumeration in ascending insertion order; the resolver's fallback
    /// scan depends on this ordering being stable.
    fn categories_for_family(&self, family_id: &str) -> Result<Vec<BudgetCategory>>;
    fn category(&self, category_id: Uuid) -> Result<Versioned<BudgetCategory>>;

    fn expenses_for_family(&self, family_id: &str) -> Result<Vec<DirectExpense>>;
    fn delete_expense(&self, expense_id: Uuid) -> Result<()>;

    fn items_for_family(&self, family_id: &str) -> Result<Vec<ShoppingItem>>;
    fn item(&self, item_id: Uuid) -> Result<Versioned<ShoppingItem>>;

    /// Atomically apply the counter update and insert the expense record;
    /// both commit together or neither does.
    fn commit_expense(&self, update: CounterUpdate, expense: DirectExpense)
        -> Result<CommitOutcome>;
    /// Atomically flip an item's bought flag and, when the item is
    /// budgeted, apply the matching counter update in the same commit.
    fn commit_item_toggle(
        &self,
        item_id: Uuid,
        item_revision: u64,
        bought: bool,
        update: Option<CounterUpdate>,
    ) -> Result<CommitOutcome>;

    /// Live query over a family's periods: the callback receives the
    /// current snapshot immediately, then a fresh full snapshot after every
    /// relevant change, until the returned handle is unsubscribed.
    fn subscribe_periods(&self, family_id: &str, callback: SnapshotFn<BudgetPeriod>)
        -> Subscription;
    /// Live query over one period's categories; same delivery contract.
    fn subscribe_categories(
        &self,
        period_id: Uuid,
        callback: SnapshotFn<BudgetCategory>,
    ) -> Subscription;
}
