//! Route definitions for the `/training` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::training;
use crate::state::AppState;

/// Routes mounted at `/training`.
///
/// ```text
/// GET    /                            -> list_trainings
/// POST   /enroll                      -> enroll
/// GET    /my-enrollments              -> my_enrollments
/// POST   /request-certificate/{id}    -> request_certificate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(training::list_trainings))
        .route("/enroll", post(training::enroll))
        .route("/my-enrollments", get(training::my_enrollments))
        .route(
            "/request-certificate/{id}",
            post(training::request_certificate),
        )
}
