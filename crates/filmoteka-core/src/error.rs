//! Error taxonomy shared by every catalog backend.
//!
//! Backends keep their own, more specific error enums and convert into this
//! one; the HTTP layer maps each variant onto a status code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A field bound or range was violated. Detected before any storage access.
  #[error("{0}")]
  Validation(String),

  /// A natural-key collision, or zero rows affected on a row that was
  /// expected to exist.
  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  NotFound(String),

  /// The per-operation deadline fired. Any open transaction has already been
  /// rolled back.
  #[error("database query time limit exceeded")]
  Timeout,

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }

  pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
