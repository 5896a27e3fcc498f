//! Shared fixtures for the docket integration tests.

pub mod test_util;
