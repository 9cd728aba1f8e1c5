//! # Forge Development Tools
//!
//! Command-line tools for rule authors:
//! - Ruleset validation
//! - Stat inspection after a research order

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod error;
pub mod inspect;
pub mod validate;
