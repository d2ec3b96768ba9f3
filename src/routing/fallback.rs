//! Response used when no route matches.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

pub const NOT_FOUND_BODY: &str = "Not found";

/// 404 with the fixed body `Not found`.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, NOT_FOUND_BODY).into_response()
}
