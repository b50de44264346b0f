//! Shared utilities.
//!
//! - [`jwt`]: token creation (seeder, tests) and verification (extractor)

pub mod jwt;
