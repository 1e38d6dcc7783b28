//! Shared test utilities for integration tests

pub mod repository;

pub use repository::*;
