//! Integration tests against a mocked gateway
pub mod utils;
