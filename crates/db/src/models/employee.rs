//! Employee models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use seatwise_core::types::{DbId, Timestamp};

/// A row from the `employees` table.
///
/// `salary` is `NUMERIC(12,2)` in the database and is read as its decimal
/// text so no precision is lost.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Employee {
    pub id: DbId,
    pub user_id: DbId,
    pub department: String,
    pub salary: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an employee record linked to an auth identity.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployee {
    pub user_id: DbId,
    pub department: String,
    /// Decimal string, e.g. `"52000.00"`. Defaults to zero.
    pub salary: Option<String>,
}
