//! Request middleware and extractors.
//!
//! # Authentication flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the JWT and parses the claims into a typed
//!    [`formline_models::roles::Principal`]
//! 3. Handlers receive the principal; scope checks happen in the services

pub mod auth;
