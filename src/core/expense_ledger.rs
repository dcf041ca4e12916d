//! Atomic expense recording against category running counters.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use uuid::Uuid;

use crate::core::category_resolver::resolve_category;
use crate::domain::DirectExpense;
use crate::errors::{BudgetError, Result};
use crate::notify::Notifier;
use crate::storage::{BudgetStore, CommitOutcome, CounterUpdate};

/// Bounds for the optimistic-concurrency retry loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: base delay doubled per attempt, capped.
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.min(16);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Records expenses and maintains category running counters.
///
/// Every counter write is a typed compare-and-swap against the category
/// document's revision. Concurrent family members posting against the same
/// category surface as transient conflicts, retried here with backoff; the
/// store retries nothing on its own.
pub struct ExpenseLedger {
    store: Arc<dyn BudgetStore>,
    notifier: Arc<dyn Notifier>,
    retry: RetryPolicy,
}

impl ExpenseLedger {
    pub fn new(store: Arc<dyn BudgetStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Records a manually entered expense: resolves the category by name,
    /// then atomically increments its counter and appends the expense
    /// record. Both writes land together or not at all.
    pub fn record_direct_expense(
        &self,
        family_id: &str,
        category_name: &str,
        amount: f64,
        description: &str,
        actor_id: &str,
    ) -> Result<()> {
        if family_id.trim().is_empty() {
            return Err(BudgetError::InvalidArgument("family id is empty".into()));
        }
        if category_name.trim().is_empty() {
            return Err(BudgetError::InvalidArgument("category name is empty".into()));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(BudgetError::InvalidArgument(format!(
                "expense amount must be positive, got {amount}"
            )));
        }

        let resolved = resolve_category(self.store.as_ref(), family_id, category_name)?;
        let category_id = resolved.category.id;

        for attempt in 0..self.retry.max_attempts {
            let current = self.store.category(category_id)?;
            let update = CounterUpdate {
                category_id,
                expected_revision: current.revision,
                new_spent: current.doc.spent + amount,
            };
            let expense = DirectExpense::new(
                family_id,
                description,
                amount,
                category_id,
                &current.doc.name,
                actor_id,
            );
            match self.store.commit_expense(update, expense)? {
                CommitOutcome::Committed => {
                    tracing::debug!(
                        category = %current.doc.name,
                        amount,
                        attempt,
                        "expense committed"
                    );
                    self.notify_best_effort(
                        "New expense",
                        &format!("{description}: {amount:.2} ({})", current.doc.name),
                    );
                    return Ok(());
                }
                CommitOutcome::Conflict => thread::sleep(self.retry.delay_for(attempt)),
            }
        }
        Err(BudgetError::Conflict {
            name: category_name.to_string(),
            attempts: self.retry.max_attempts,
        })
    }

    /// Shopping-list hook: flips an item's bought flag and keeps the
    /// category counter in step, in one atomic commit.
    ///
    /// Buying adds `estimated_price * quantity`; un-buying subtracts the
    /// same amount (floored at zero against counter drift). Idempotent:
    /// setting the flag to its current value does nothing. Items without a
    /// category name flip the flag only.
    pub fn set_item_bought(&self, family_id: &str, item_id: Uuid, bought: bool) -> Result<()> {
        if family_id.trim().is_empty() {
            return Err(BudgetError::InvalidArgument("family id is empty".into()));
        }

        for attempt in 0..self.retry.max_attempts {
            let item = self.store.item(item_id)?;
            // Another family's item must not drive counters resolved in
            // this family's periods.
            if item.doc.family_id != family_id {
                return Err(BudgetError::NotFound(format!("item {item_id}")));
            }
            if item.doc.is_bought == bought {
                return Ok(());
            }
            let update = if item.doc.category_name.is_empty() {
                None
            } else {
                let resolved =
                    resolve_category(self.store.as_ref(), family_id, &item.doc.category_name)?;
                let current = self.store.category(resolved.category.id)?;
                let delta = item.doc.cost();
                let new_spent = if bought {
                    current.doc.spent + delta
                } else {
                    (current.doc.spent - delta).max(0.0)
                };
                Some(CounterUpdate {
                    category_id: current.doc.id,
                    expected_revision: current.revision,
                    new_spent,
                })
            };
            match self
                .store
                .commit_item_toggle(item_id, item.revision, bought, update)?
            {
                CommitOutcome::Committed => {
                    tracing::debug!(item = %item.doc.name, bought, attempt, "item toggled");
                    return Ok(());
                }
                CommitOutcome::Conflict => thread::sleep(self.retry.delay_for(attempt)),
            }
        }
        Err(BudgetError::Conflict {
            name: item_id.to_string(),
            attempts: self.retry.max_attempts,
        })
    }

    /// Deletes an expense record. The category counter is intentionally
    /// left untouched; whether deletion should reverse it is an open
    /// product decision, and today's behavior is to keep the counter.
    pub fn delete_direct_expense(&self, expense_id: Uuid) -> Result<()> {
        self.store.delete_expense(expense_id)
    }

    fn notify_best_effort(&self, title: &str, body: &str) {
        if let Err(err) = self.notifier.notify(title, body) {
            tracing::warn!(%err, "notification dropped");
        }
    }
}
