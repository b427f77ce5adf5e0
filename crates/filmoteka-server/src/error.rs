//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body is a single JSON string.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

/// An error returned by an API handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The request body could not be parsed.
  #[error("{0}")]
  Malformed(String),

  /// No session cookie, or the token failed verification.
  #[error("Unauthenticated")]
  Unauthenticated,

  /// A valid token whose subject does not exist.
  #[error("You are not logged in")]
  Unauthorized,

  /// Authenticated, but not an admin. Answered with 401 like the other
  /// access failures; only the message differs.
  #[error("You do not have administrator privileges")]
  Forbidden,

  #[error("Incorrect password")]
  IncorrectPassword,

  #[error(transparent)]
  Catalog(#[from] filmoteka_core::Error),

  /// Something on our side failed outside the store (e.g. hashing).
  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  /// Classify a backend error through the catalog taxonomy.
  pub fn store(e: impl Into<filmoteka_core::Error>) -> Self { ApiError::Catalog(e.into()) }

  pub fn status(&self) -> StatusCode {
    use filmoteka_core::Error as Catalog;
    match self {
      ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthenticated
      | ApiError::Unauthorized
      | ApiError::Forbidden
      | ApiError::IncorrectPassword => StatusCode::UNAUTHORIZED,
      ApiError::Catalog(Catalog::Validation(_) | Catalog::Conflict(_)) => {
        StatusCode::BAD_REQUEST
      }
      ApiError::Catalog(Catalog::NotFound(_)) => StatusCode::NOT_FOUND,
      ApiError::Catalog(Catalog::Timeout) => StatusCode::GATEWAY_TIMEOUT,
      ApiError::Catalog(Catalog::Storage(_)) | ApiError::Internal(_) => {
        StatusCode::INTERNAL_SERVER_ERROR
      }
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { ApiError::Malformed(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
      error!(error = %self, "request failed");
      "Internal server error".to_owned()
    } else {
      self.to_string()
    };
    (status, Json(message)).into_response()
  }
}
