//! # Formline Core
//!
//! Core types, errors, and utilities for the Formline API.
//!
//! This crate provides foundational types used throughout the Formline
//! application:
//!
//! - [`errors`]: Application error types with HTTP response conversion, plus
//!   the approval-workflow error taxonomy
//! - [`pagination`]: Pagination utilities for API responses
//!
//! # Example
//!
//! ```ignore
//! use formline_core::errors::{AppError, WorkflowError};
//! use formline_core::pagination::{PaginationParams, PaginationMeta};
//!
//! // Infrastructure error
//! let error = AppError::not_found(anyhow::anyhow!("School not found"));
//!
//! // Workflow outcome, surfaced to callers as a value with an HTTP mapping
//! let err = WorkflowError::InvalidTransition {
//!     from: "approved".into(),
//!     to: "pending".into(),
//! };
//!
//! // Use pagination
//! let params = PaginationParams::default();
//! let limit = params.limit();
//! ```

pub mod errors;
pub mod pagination;

// Re-export commonly used types at crate root
pub use errors::{AppError, WorkflowError};
pub use pagination::{PaginationMeta, PaginationParams};
