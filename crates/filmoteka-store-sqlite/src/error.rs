//! Error type for `filmoteka-store-sqlite`.

use filmoteka_core::catalog::{ActorId, MovieId};
use rusqlite::{ErrorCode, ffi};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] filmoteka_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The per-operation deadline passed, or the database stayed locked until
  /// it did.
  #[error("database query time limit exceeded")]
  Timeout,

  #[error("actor already exists")]
  ActorExists,

  #[error("movie already exists")]
  MovieExists,

  #[error("username already exists")]
  UsernameTaken,

  #[error("actor {actor_id} is already linked to movie {movie_id}")]
  LinkExists { actor_id: ActorId, movie_id: MovieId },

  #[error("actor not found: {0}")]
  ActorNotFound(ActorId),

  #[error("movie not found: {0}")]
  MovieNotFound(MovieId),

  /// A delete matched no row.
  #[error("actor {0} not deleted: no such actor")]
  ActorNotDeleted(ActorId),

  #[error("movie {0} not deleted: no such movie")]
  MovieNotDeleted(MovieId),

  #[error("actor {actor_id} is not linked to movie {movie_id}")]
  LinkNotFound { actor_id: ActorId, movie_id: MovieId },

  #[error("person not found: {0}")]
  PersonNotFound(uuid::Uuid),

  #[error("username not found: {0}")]
  UsernameNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// Interrupts come from the deadline's progress handler; busy means a lock
// was still held when the busy timeout (also the deadline) ran out.
impl From<rusqlite::Error> for Error {
  fn from(e: rusqlite::Error) -> Self {
    match e.sqlite_error_code() {
      Some(ErrorCode::OperationInterrupted | ErrorCode::DatabaseBusy) => Self::Timeout,
      _ => Self::Sqlite(e),
    }
  }
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Rusqlite(e) => e.into(),
      other => Self::Database(other),
    }
  }
}

// ─── Constraint classification ───────────────────────────────────────────────

/// Which integrity constraint a failed statement ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Constraint {
  /// UNIQUE or PRIMARY KEY.
  Unique,
  ForeignKey,
}

impl Error {
  pub(crate) fn constraint(&self) -> Option<Constraint> {
    let Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) = self else {
      return None;
    };
    match err.extended_code {
      ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
        Some(Constraint::Unique)
      }
      ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Some(Constraint::ForeignKey),
      _ => None,
    }
  }

  /// Replace a constraint violation of `kind` with `with`; anything else is
  /// returned unchanged.
  pub(crate) fn on_constraint(self, kind: Constraint, with: Self) -> Self {
    if self.constraint() == Some(kind) { with } else { self }
  }
}

// ─── Classification into the catalog taxonomy ────────────────────────────────

impl From<Error> for filmoteka_core::Error {
  fn from(e: Error) -> Self {
    use filmoteka_core::Error as Core;
    match e {
      Error::Core(inner) => inner,
      Error::Timeout => Core::Timeout,
      Error::ActorExists => Core::conflict("Actor already exists"),
      Error::MovieExists => Core::conflict("Movie already exists"),
      Error::UsernameTaken => Core::conflict("Username already exists"),
      Error::LinkExists { .. } => {
        Core::conflict("Actor is already linked to this movie")
      }
      Error::ActorNotFound(_) => Core::conflict("Actor doesn't exist"),
      Error::MovieNotFound(_) => Core::conflict("Movie doesn't exist"),
      Error::ActorNotDeleted(_) => {
        Core::conflict("Actor doesn't exist. Nothing deleted")
      }
      Error::MovieNotDeleted(_) => {
        Core::conflict("Movie doesn't exist. Nothing deleted")
      }
      Error::LinkNotFound { .. } => {
        Core::conflict("Actor is not linked to this movie")
      }
      Error::PersonNotFound(_) => Core::NotFound("Person not found".into()),
      Error::UsernameNotFound(_) => Core::NotFound("Username not found".into()),
      other @ (Error::Database(_)
      | Error::Sqlite(_)
      | Error::Uuid(_)
      | Error::DateParse(_)) => Core::Storage(Box::new(other)),
    }
  }
}
