//! Integration tests for sieve.
//!
//! These tests require LocalStack to be running:
//! ```bash
//! docker run -d -p 4566:4566 -e SERVICES=s3 localstack/localstack
//! cargo test -p integration-tests -- --ignored
//! ```
//!
//! Set `LOCALSTACK_ENDPOINT` to point at a non-default instance.

mod s3_test;
