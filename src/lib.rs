#![doc(test(attr(deny(warnings))))]

//! Hearth Budget is the budget engine behind a household coordination app:
//! period and category resolution, an atomic expense ledger over optimistic
//! document transactions, and an independent spend aggregator for
//! dashboards.

pub mod core;
pub mod domain;
pub mod errors;
pub mod notify;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Hearth Budget tracing initialized.");
    });
}
