//! Training models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use seatwise_core::types::{Date, DbId, Timestamp};

/// A row from the `trainings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Training {
    pub id: DbId,
    pub name: String,
    pub department: String,
    pub total_seats: i32,
    pub available_seats: i32,
    pub start_date: Date,
    pub end_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a training. All seats start out available.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTraining {
    pub name: String,
    pub department: String,
    pub total_seats: i32,
    pub start_date: Date,
    pub end_date: Date,
}

/// Query parameters for `GET /api/v1/training`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingListParams {
    /// Exact department match. Blank values are treated as no filter.
    pub department: Option<String>,
}

impl TrainingListParams {
    /// The department filter, if one was actually supplied.
    pub fn department(&self) -> Option<&str> {
        self.department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}
