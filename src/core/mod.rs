pub mod category_resolver;
pub mod expense_ledger;
pub mod period_resolver;
pub mod spend_summary;

pub use category_resolver::{initialize_default_categories, resolve_category, ResolvedCategory};
pub use expense_ledger::{ExpenseLedger, RetryPolicy};
pub use period_resolver::{most_recent_period, resolve_active_period};
pub use spend_summary::{
    compute_category_spend, summarize_period, CategorySummary, PeriodSummary, SpendLevel,
};
