//! # Forge Test Utilities
//!
//! Shared testing utilities for all crates:
//! - Determinism test harness
//! - The standard ruleset and world fixtures
//! - A sight map that records every call
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;
pub mod sight;

/// Re-export proptest for convenience.
pub use proptest;
