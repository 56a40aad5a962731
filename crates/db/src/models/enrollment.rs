//! Enrollment models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use seatwise_core::types::{Date, DbId, Timestamp};

/// A row from the `enrollments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enrollment {
    pub id: DbId,
    pub employee_id: DbId,
    pub training_id: DbId,
    pub status_id: i16,
    pub certificate_requested: bool,
    pub certificate_requested_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An enrollment joined with its status name and a summary of its training.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EnrollmentDetail {
    pub id: DbId,
    pub employee_id: DbId,
    pub training_id: DbId,
    pub status_id: i16,
    pub status: String,
    pub certificate_requested: bool,
    pub certificate_requested_at: Option<Timestamp>,
    pub training_name: String,
    pub training_department: String,
    pub training_start_date: Date,
    pub training_end_date: Date,
    pub created_at: Timestamp,
}

/// Request body for `POST /api/v1/training/enroll`.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrollRequest {
    pub training_id: DbId,
}
