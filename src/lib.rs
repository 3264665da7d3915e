#![doc(test(attr(deny(warnings))))]

//! Finance Ledger keeps income, expense and investment records in a CSV file, with a
//! per-kind category registry, period aggregation and locale-aware currency display.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod session;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Finance Ledger tracing initialized.");
    });
}
