//! Shared test setup.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     // ... rotations and removals now log through the test writer
//! }
//! ```
//!
//! `RUST_LOG` selects what is shown, e.g. `RUST_LOG=oaktree=trace` for every
//! insert, removal, and rotation, or `oaktree=debug` for balance summaries.

#![allow(dead_code)]

use std::sync::Once;

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Default level if `RUST_LOG` is not set.
const DEFAULT_LEVEL: Level = Level::WARN;

/// Installs a console subscriber that writes through the test harness.
///
/// Safe to call multiple times; only the first call takes effect.
pub fn init_tracing() {
	INIT.call_once(|| {
		let filter = EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL.to_string()));

		// try_init: another test binary component may already own the global subscriber
		let _ = tracing_subscriber::fmt()
			.with_env_filter(filter)
			.with_test_writer()
			.with_target(true)
			.with_span_events(FmtSpan::CLOSE)
			.compact()
			.try_init();
	});
}
