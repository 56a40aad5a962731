//! Request handlers.
//!
//! Handlers delegate to the repositories in `seatwise_db` and map errors
//! via [`AppError`](crate::error::AppError).

pub mod training;
