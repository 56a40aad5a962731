//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Steps that must run inside a caller's
//! transaction take `&mut Transaction<'_, Postgres>` instead.

pub mod employee_repo;
pub mod enrollment_repo;
pub mod training_repo;

pub use employee_repo::EmployeeRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use training_repo::TrainingRepo;
