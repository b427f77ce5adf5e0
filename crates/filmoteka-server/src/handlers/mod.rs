//! Route handlers, grouped by resource.
//!
//! Mutations answer with a JSON string message; reads answer with a JSON
//! array. Access is declared by the first extractor of each handler.

pub mod accounts;
pub mod actors;
pub mod movies;

use axum::extract::FromRequest;
use serde::Deserialize;

use crate::error::ApiError;

/// `axum::Json`, with parse failures reported as [`ApiError::Malformed`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `{"id": …}`. A missing id reads as 0 and fails validation.
#[derive(Debug, Deserialize)]
pub struct IdBody {
  #[serde(default)]
  pub id: i64,
}
