//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller's user id from a JWT Bearer token.
//! - [`auth::CurrentEmployee`] -- Resolves the caller to their employee record.

pub mod auth;
