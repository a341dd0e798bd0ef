//! Shared harness for sieve integration tests.
//!
//! The tests themselves live under `integration/` and need LocalStack; see
//! that module for how to run them.

mod localstack;

pub use localstack::{LocalStackTestContext, generate_test_ndjson, gzip};
