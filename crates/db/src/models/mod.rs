//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts (used by the administrative
//!   process that owns trainings and employees)

pub mod employee;
pub mod enrollment;
pub mod status;
pub mod training;
