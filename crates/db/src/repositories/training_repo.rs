//! Repository for the `trainings` table.
//!
//! `available_seats` is only ever written by [`TrainingRepo::take_seat`],
//! which runs inside the enrollment transaction after the row is locked.

use sqlx::{PgPool, Postgres, Transaction};
use seatwise_core::types::DbId;

use crate::models::training::{CreateTraining, Training};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, department, total_seats, available_seats, \
                       start_date, end_date, created_at, updated_at";

/// Provides catalogue reads and the locked seat update for trainings.
pub struct TrainingRepo;

impl TrainingRepo {
    /// Insert a new training with every seat available.
    pub async fn create(pool: &PgPool, input: &CreateTraining) -> Result<Training, sqlx::Error> {
        let query = format!(
            "INSERT INTO trainings (name, department, total_seats, available_seats, start_date, end_date)
             VALUES ($1, $2, $3, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Training>(&query)
            .bind(&input.name)
            .bind(&input.department)
            .bind(input.total_seats)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    /// Find a training by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Training>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trainings WHERE id = $1");
        sqlx::query_as::<_, Training>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List trainings, optionally restricted to one department, soonest first.
    pub async fn list(
        pool: &PgPool,
        department: Option<&str>,
    ) -> Result<Vec<Training>, sqlx::Error> {
        match department {
            Some(department) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM trainings \
                     WHERE department = $1 \
                     ORDER BY start_date, id"
                );
                sqlx::query_as::<_, Training>(&query)
                    .bind(department)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!("SELECT {COLUMNS} FROM trainings ORDER BY start_date, id");
                sqlx::query_as::<_, Training>(&query).fetch_all(pool).await
            }
        }
    }

    // -----------------------------------------------------------------------
    // Transaction-scoped steps
    // -----------------------------------------------------------------------

    /// Load a training and hold its row lock until the transaction ends.
    ///
    /// Concurrent enrollments on the same training queue here; other
    /// trainings are unaffected.
    pub async fn lock_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Training>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trainings WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Training>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Consume one seat. Returns `None` if no seat was left to take.
    ///
    /// The `available_seats > 0` guard keeps the counter from going negative
    /// even if a caller skipped the lock.
    pub async fn take_seat(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Training>, sqlx::Error> {
        let query = format!(
            "UPDATE trainings SET available_seats = available_seats - 1 \
             WHERE id = $1 AND available_seats > 0 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Training>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }
}
