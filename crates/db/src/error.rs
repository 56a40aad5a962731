//! Error types for multi-statement repository operations.

use seatwise_core::training::EnrollmentError;

/// PostgreSQL SQLSTATE codes for failures that abort a transaction without
/// any effect and may succeed if the caller retries.
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";
const LOCK_NOT_AVAILABLE: &str = "55P03";
const QUERY_CANCELED: &str = "57014";

/// PostgreSQL SQLSTATE for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Failure of a transactional enrollment operation.
///
/// Either the domain rules refused the request, or the database could not
/// complete the transaction. In both cases nothing was committed.
#[derive(Debug, thiserror::Error)]
pub enum EnrollError {
    #[error(transparent)]
    Rejected(#[from] EnrollmentError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Whether a sqlx error means the transaction could not be carried out
/// (lock wait exceeded, deadlock, serialization failure, cancelled
/// statement, no pooled connection in time).
pub fn is_transaction_failure(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut => true,
        sqlx::Error::Database(db_err) => matches!(
            db_err.code().as_deref(),
            Some(SERIALIZATION_FAILURE | DEADLOCK_DETECTED | LOCK_NOT_AVAILABLE | QUERY_CANCELED)
        ),
        _ => false,
    }
}

/// Whether a sqlx error is a unique violation of the named constraint.
pub fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
                && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}
