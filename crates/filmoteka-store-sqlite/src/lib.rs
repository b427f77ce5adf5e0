//! SQLite backend for the Filmoteka catalog.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every operation carries a deadline;
//! every write runs in its own transaction.

mod deadline;
mod encode;
mod query;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{DEFAULT_QUERY_TIMEOUT, SqliteStore};
