use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nw_core::Error;
use serde_json::json;

/// Maps core outcomes onto HTTP statuses and an `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(Error::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Retrieval(_) | Error::Publish(_) => StatusCode::BAD_GATEWAY,
            Error::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(json!({ "error": self.0.reason() }))).into_response()
    }
}
