//! JWT-based authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use seatwise_core::error::CoreError;
use seatwise_core::training::EnrollmentError;
use seatwise_core::types::DbId;
use seatwise_db::models::employee::Employee;
use seatwise_db::repositories::EmployeeRepo;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The caller's user id (from `claims.sub`).
    pub user_id: DbId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

/// The employee record behind the authenticated caller.
///
/// Rejects with 401 when the token is missing or invalid, and with 404 when
/// the token is valid but no employee is linked to its user id.
///
/// ```ignore
/// async fn mine(CurrentEmployee(employee): CurrentEmployee) -> AppResult<Json<()>> {
///     tracing::info!(employee_id = employee.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
pub struct CurrentEmployee(pub Employee);

impl FromRequestParts<AppState> for CurrentEmployee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let employee = EmployeeRepo::find_by_user_id(&state.pool, user.user_id)
            .await?
            .ok_or(EnrollmentError::EmployeeNotFound {
                user_id: user.user_id,
            })?;
        Ok(CurrentEmployee(employee))
    }
}
