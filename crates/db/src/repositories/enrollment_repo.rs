//! Repository for the `enrollments` table.
//!
//! Enrolling reserves a seat and creates the enrollment in one transaction:
//!
//! 1. lock the training row (`FOR UPDATE`)
//! 2. refuse if the training is missing, full, or already joined
//! 3. take the seat
//! 4. insert the enrollment
//!
//! The seat is taken before the enrollment row exists, and both are
//! committed together or not at all.

use std::time::Duration;

use seatwise_core::training::{self, CertificateAction, EnrollmentError};
use seatwise_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::{is_unique_violation, EnrollError};
use crate::models::enrollment::{Enrollment, EnrollmentDetail};
use crate::models::status::EnrollmentStatus;
use crate::repositories::TrainingRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, employee_id, training_id, status_id, certificate_requested, \
                       certificate_requested_at, created_at, updated_at";

/// Unique constraint backing "one enrollment per employee and training".
const UQ_EMPLOYEE_TRAINING: &str = "uq_enrollments_employee_training";

/// Provides the enrollment transaction and enrollment queries.
pub struct EnrollmentRepo;

impl EnrollmentRepo {
    // -----------------------------------------------------------------------
    // Enroll
    // -----------------------------------------------------------------------

    /// Enroll an employee in a training, consuming one seat.
    ///
    /// `lock_timeout` bounds how long this call waits behind other
    /// enrollments on the same training; exceeding it fails the transaction
    /// with SQLSTATE `55P03` and nothing is committed.
    pub async fn enroll(
        pool: &PgPool,
        employee_id: DbId,
        training_id: DbId,
        lock_timeout: Duration,
    ) -> Result<Enrollment, EnrollError> {
        let mut tx = pool.begin().await?;

        set_lock_timeout(&mut tx, lock_timeout).await?;
        let enrollment = Self::enroll_in_tx(&mut tx, employee_id, training_id).await?;

        tx.commit().await?;

        tracing::debug!(
            enrollment_id = enrollment.id,
            employee_id,
            training_id,
            "Enrollment committed",
        );
        Ok(enrollment)
    }

    /// The enrollment steps, run inside a caller-owned transaction.
    ///
    /// On `Err` the caller must not commit; dropping the transaction rolls
    /// back the seat update.
    pub async fn enroll_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        employee_id: DbId,
        training_id: DbId,
    ) -> Result<Enrollment, EnrollError> {
        let training = TrainingRepo::lock_for_update(tx, training_id)
            .await?
            .ok_or(EnrollmentError::TrainingNotFound(training_id))?;

        training::check_seat_available(training.available_seats)?;

        if Self::exists_in_tx(tx, employee_id, training_id).await? {
            return Err(EnrollmentError::AlreadyEnrolled.into());
        }

        TrainingRepo::take_seat(tx, training_id)
            .await?
            .ok_or(EnrollmentError::NoSeatsAvailable)?;

        let query = format!(
            "INSERT INTO enrollments (employee_id, training_id, status_id, certificate_requested) \
             VALUES ($1, $2, $3, false) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(employee_id)
            .bind(training_id)
            .bind(EnrollmentStatus::Ongoing.id())
            .fetch_one(&mut **tx)
            .await
            .map_err(|err| {
                if is_unique_violation(&err, UQ_EMPLOYEE_TRAINING) {
                    EnrollError::Rejected(EnrollmentError::AlreadyEnrolled)
                } else {
                    EnrollError::Database(err)
                }
            })
    }

    /// Whether the employee already holds an enrollment for the training.
    async fn exists_in_tx(
        tx: &mut Transaction<'_, Postgres>,
        employee_id: DbId,
        training_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS ( \
                 SELECT 1 FROM enrollments WHERE employee_id = $1 AND training_id = $2 \
             )",
        )
        .bind(employee_id)
        .bind(training_id)
        .fetch_one(&mut **tx)
        .await?;
        Ok(row.0)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// All enrollments of an employee with their training summaries,
    /// ordered by training start date.
    pub async fn list_for_employee(
        pool: &PgPool,
        employee_id: DbId,
    ) -> Result<Vec<EnrollmentDetail>, sqlx::Error> {
        sqlx::query_as::<_, EnrollmentDetail>(
            "SELECT e.id, e.employee_id, e.training_id, e.status_id, s.name AS status, \
                    e.certificate_requested, e.certificate_requested_at, \
                    t.name AS training_name, t.department AS training_department, \
                    t.start_date AS training_start_date, t.end_date AS training_end_date, \
                    e.created_at \
             FROM enrollments e \
             JOIN trainings t ON t.id = e.training_id \
             JOIN enrollment_statuses s ON s.id = e.status_id \
             WHERE e.employee_id = $1 \
             ORDER BY t.start_date, e.id",
        )
        .bind(employee_id)
        .fetch_all(pool)
        .await
    }

    /// Find an enrollment only if it belongs to the given employee.
    pub async fn find_for_employee(
        pool: &PgPool,
        enrollment_id: DbId,
        employee_id: DbId,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM enrollments WHERE id = $1 AND employee_id = $2");
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(enrollment_id)
            .bind(employee_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of enrollments held against a training.
    pub async fn count_for_training(pool: &PgPool, training_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM enrollments WHERE training_id = $1")
            .bind(training_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    // -----------------------------------------------------------------------
    // Certificate
    // -----------------------------------------------------------------------

    /// Request the completion certificate for one of the employee's
    /// enrollments.
    ///
    /// A missing enrollment and one owned by someone else are reported
    /// identically. A repeat request returns the row unchanged.
    pub async fn request_certificate(
        pool: &PgPool,
        enrollment_id: DbId,
        employee_id: DbId,
    ) -> Result<Enrollment, EnrollError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "SELECT {COLUMNS} FROM enrollments \
             WHERE id = $1 AND employee_id = $2 \
             FOR UPDATE"
        );
        let enrollment = sqlx::query_as::<_, Enrollment>(&query)
            .bind(enrollment_id)
            .bind(employee_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(EnrollmentError::EnrollmentNotFoundOrUnauthorized(enrollment_id))?;

        let action =
            training::check_certificate_request(enrollment.status_id, enrollment.certificate_requested)?;

        let enrollment = match action {
            CertificateAction::AlreadyRequested => enrollment,
            CertificateAction::MarkRequested => {
                let query = format!(
                    "UPDATE enrollments \
                     SET certificate_requested = true, certificate_requested_at = NOW() \
                     WHERE id = $1 \
                     RETURNING {COLUMNS}"
                );
                sqlx::query_as::<_, Enrollment>(&query)
                    .bind(enrollment_id)
                    .fetch_one(&mut *tx)
                    .await?
            }
        };

        tx.commit().await?;
        Ok(enrollment)
    }

    // -----------------------------------------------------------------------
    // Administrative
    // -----------------------------------------------------------------------

    /// Move an enrollment to a new status. Used by the administrative
    /// completion process, never by the employee-facing API.
    ///
    /// Returns `None` if the enrollment does not exist.
    pub async fn set_status(
        pool: &PgPool,
        enrollment_id: DbId,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>, sqlx::Error> {
        let query = format!(
            "UPDATE enrollments SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enrollment>(&query)
            .bind(enrollment_id)
            .bind(status.id())
            .fetch_optional(pool)
            .await
    }
}

/// Bound lock waits for the rest of the transaction.
///
/// Postgres reads `lock_timeout = 0` as "wait forever", so the value is
/// never allowed below one millisecond.
async fn set_lock_timeout(
    tx: &mut Transaction<'_, Postgres>,
    timeout: Duration,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT set_config('lock_timeout', $1, true)")
        .bind(lock_timeout_setting(timeout))
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// `lock_timeout` value for a duration, rounded down to whole milliseconds
/// but never below `1ms`.
fn lock_timeout_setting(timeout: Duration) -> String {
    format!("{}ms", timeout.as_millis().max(1))
}
