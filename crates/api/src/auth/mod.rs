//! Authentication primitives.
//!
//! Tokens are issued by the identity service; this server only validates
//! them and reads the caller's user id.
//!
//! - [`jwt`] -- JWT access-token validation (and generation, for tooling and tests).

pub mod jwt;
