pub mod category;
pub mod common;
pub mod expense;
pub mod period;
pub mod shopping;

pub use category::{BudgetCategory, DEFAULT_CATEGORY_NAMES};
pub use common::{Identifiable, NamedEntity};
pub use expense::DirectExpense;
pub use period::BudgetPeriod;
pub use shopping::ShoppingItem;
