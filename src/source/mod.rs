//! Paged data sources
//!
//! This module provides:
//! - The `RdsSource` trait every collector talks to
//! - The AWS SDK backed implementation used in production
//! - An in-memory implementation for tests
//!
//! Nothing outside this module knows about the AWS SDK types.

pub mod adapter;
pub mod aws;
#[cfg(test)]
pub mod mock;

pub use adapter::RdsSource;
