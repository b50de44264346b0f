//! Configuration modules.
//!
//! Each submodule owns one concern, loaded from environment variables via a
//! `from_env()` constructor with sensible development defaults.
//!
//! - [`cors`]: allowed origins for the CORS layer
//! - [`database`]: PostgreSQL connection pool initialization
//! - [`jwt`]: token secret and expiry
//! - [`session`]: session cache TTL

pub mod cors;
pub mod database;
pub mod jwt;
pub mod session;
