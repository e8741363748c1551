//! Common test utilities shared by the application tests

pub mod test_helpers;

pub use test_helpers::*;
