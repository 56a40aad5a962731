pub mod health;
pub mod training;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /training                                   list trainings (?department=)
/// /training/enroll                            enroll caller (POST)
/// /training/my-enrollments                    caller's enrollments
/// /training/request-certificate/{id}          request certificate (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/training", training::router())
}
