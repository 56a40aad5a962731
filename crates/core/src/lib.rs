//! Domain types and rules for the training enrollment service.
//!
//! This crate has no I/O. The database and HTTP layers call into it for
//! error taxonomy and the seat / certificate eligibility checks.

pub mod error;
pub mod training;
pub mod types;
