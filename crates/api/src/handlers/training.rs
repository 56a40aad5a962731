//! Handlers for the training catalogue and employee enrollments.
//!
//! All endpoints require authentication. Enrollment endpoints act on the
//! employee linked to the caller's token via [`CurrentEmployee`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use seatwise_core::types::DbId;
use seatwise_db::models::enrollment::EnrollRequest;
use seatwise_db::models::training::TrainingListParams;
use seatwise_db::repositories::{EnrollmentRepo, TrainingRepo};

use crate::error::AppResult;
use crate::middleware::auth::{AuthUser, CurrentEmployee};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/training
///
/// List trainings, optionally filtered by `?department=`.
pub async fn list_trainings(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<TrainingListParams>,
) -> AppResult<impl IntoResponse> {
    let trainings = TrainingRepo::list(&state.pool, params.department()).await?;

    Ok(Json(DataResponse { data: trainings }))
}

/// POST /api/v1/training/enroll
///
/// Enroll the caller in a training, consuming one seat.
pub async fn enroll(
    CurrentEmployee(employee): CurrentEmployee,
    State(state): State<AppState>,
    Json(input): Json<EnrollRequest>,
) -> AppResult<impl IntoResponse> {
    let result = EnrollmentRepo::enroll(
        &state.pool,
        employee.id,
        input.training_id,
        state.config.enroll_lock_timeout,
    )
    .await;

    let enrollment = match result {
        Ok(enrollment) => enrollment,
        Err(err) => {
            tracing::info!(
                employee_id = employee.id,
                training_id = input.training_id,
                error = %err,
                "Enrollment refused",
            );
            return Err(err.into());
        }
    };

    tracing::info!(
        enrollment_id = enrollment.id,
        employee_id = employee.id,
        training_id = input.training_id,
        "Employee enrolled",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: enrollment })))
}

/// GET /api/v1/training/my-enrollments
///
/// List the caller's enrollments with training summaries.
pub async fn my_enrollments(
    CurrentEmployee(employee): CurrentEmployee,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let enrollments = EnrollmentRepo::list_for_employee(&state.pool, employee.id).await?;

    Ok(Json(DataResponse { data: enrollments }))
}

/// POST /api/v1/training/request-certificate/{id}
///
/// Request the certificate for one of the caller's completed enrollments.
pub async fn request_certificate(
    CurrentEmployee(employee): CurrentEmployee,
    State(state): State<AppState>,
    Path(enrollment_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let enrollment =
        EnrollmentRepo::request_certificate(&state.pool, enrollment_id, employee.id).await?;

    tracing::info!(
        enrollment_id,
        employee_id = employee.id,
        "Certificate requested",
    );

    Ok(Json(DataResponse { data: enrollment }))
}
