//! Seat and certificate rules for training enrollment.
//!
//! Lives in `core` (zero internal deps) so the transaction code in the `db`
//! crate and the HTTP handlers share one definition of when an enrollment or
//! a certificate request is allowed, and of how a refusal is reported.

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Enrollment status
// ---------------------------------------------------------------------------

/// Enrollment status IDs matching `enrollment_statuses` seed data.
///
/// Duplicated from the `db` crate's `EnrollmentStatus` enum because `core`
/// must have zero internal deps.
pub const STATUS_ONGOING_ID: i16 = 1;
pub const STATUS_COMPLETED_ID: i16 = 2;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons an enrollment or certificate request is refused.
///
/// Every variant is a client-visible outcome; storage failures are carried
/// separately by the layers that talk to the database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentError {
    #[error("Training {0} not found")]
    TrainingNotFound(DbId),

    #[error("No seats available")]
    NoSeatsAvailable,

    #[error("Already enrolled in this training")]
    AlreadyEnrolled,

    /// Covers both a missing enrollment and one owned by another employee,
    /// so callers cannot probe for other employees' records.
    #[error("Enrollment {0} not found")]
    EnrollmentNotFoundOrUnauthorized(DbId),

    #[error("You have to complete the training first")]
    TrainingNotCompleted,

    #[error("Employee not found for user {user_id}")]
    EmployeeNotFound { user_id: DbId },
}

impl From<EnrollmentError> for CoreError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::TrainingNotFound(id) => CoreError::NotFound {
                entity: "Training",
                id,
            },
            EnrollmentError::EnrollmentNotFoundOrUnauthorized(id) => CoreError::NotFound {
                entity: "Enrollment",
                id,
            },
            EnrollmentError::EmployeeNotFound { user_id } => CoreError::NotFound {
                entity: "Employee for user",
                id: user_id,
            },
            EnrollmentError::NoSeatsAvailable | EnrollmentError::AlreadyEnrolled => {
                CoreError::Conflict(err.to_string())
            }
            EnrollmentError::TrainingNotCompleted => CoreError::InvalidState(err.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

/// A training can take one more enrollment only while it has a free seat.
pub fn check_seat_available(available_seats: i32) -> Result<(), EnrollmentError> {
    if available_seats <= 0 {
        return Err(EnrollmentError::NoSeatsAvailable);
    }
    Ok(())
}

/// What a certificate request should do to an enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateAction {
    /// First request on a completed enrollment: set the flag.
    MarkRequested,
    /// Already requested: leave the row as it is and report success.
    AlreadyRequested,
}

/// Decide whether a certificate may be requested for an enrollment.
///
/// Only completed trainings qualify. A repeat request is accepted as a no-op
/// rather than reported as an error.
pub fn check_certificate_request(
    status_id: i16,
    certificate_requested: bool,
) -> Result<CertificateAction, EnrollmentError> {
    if status_id != STATUS_COMPLETED_ID {
        return Err(EnrollmentError::TrainingNotCompleted);
    }
    if certificate_requested {
        Ok(CertificateAction::AlreadyRequested)
    } else {
        Ok(CertificateAction::MarkRequested)
    }
}
