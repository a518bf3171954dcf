#![forbid(unsafe_code)]

//! Logging for tests.
//!
//! `RUST_LOG` overrides the default filter, e.g.
//! `RUST_LOG=bottomsheet=trace cargo test -p bottomsheet-harness`.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "bottomsheet=debug,bottomsheet_core=debug";

/// Install a test-writer subscriber. Safe to call from every test.
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A subscriber from an earlier test in this binary stays in place.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer().with_target(true))
        .try_init();
}

/// Emit one JSON line describing a check, for log scraping in CI.
pub fn log_jsonl(test: &str, check: &str, passed: bool, notes: &str) {
    let record = serde_json::json!({
        "test": test,
        "check": check,
        "passed": passed,
        "notes": notes,
    });
    eprintln!("{record}");
}
