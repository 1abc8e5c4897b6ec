//! Integration test infrastructure for Keyward.
//!
//! Starts PostgreSQL with testcontainers and serves the API on an ephemeral
//! port so tests can drive it over real HTTP.
//!
//! # Usage
//!
//! ```ignore
//! use keyward_tests::TestContext;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let ctx = TestContext::new().await.unwrap();
//!     // Use ctx.db, ctx.db_url(), etc.
//! }
//! ```

pub mod containers;
pub mod context;
pub mod fixtures;
pub mod helpers;

pub use context::TestContext;
pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging (safe to call repeatedly).
pub fn init_test_logging() {
    keyward_trace::init_test_tracing();
}
