use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BudgetError>;

/// Error type that captures the budget engine's failure modes.
#[derive(Debug, Error)]
pub enum BudgetError {
    /// Rejected before any store access: empty ids, empty names,
    /// non-positive amounts.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// No category with the given name exists in any of the family's
    /// periods. Actionable by the caller; never retried automatically.
    #[error("no category named `{0}` exists; create this category first")]
    CategoryNotFound(String),
    /// Optimistic-concurrency retries exhausted on a contended document.
    #[error("write conflict on `{name}` persisted after {attempts} attempts")]
    Conflict { name: String, attempts: u32 },
    /// A referenced document (period, item, expense) does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
