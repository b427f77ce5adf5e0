//! Per-operation deadlines and the transaction scope every write runs in.
//!
//! A [`Deadline`] is fixed when an operation is requested, so time spent
//! queued behind other operations on the connection counts against it. It is
//! enforced on the database thread by a progress handler that interrupts the
//! running statement, and by a busy timeout for lock waits.

use std::time::{Duration, Instant};

use rusqlite::{Connection, Transaction};
use tracing::{debug, warn};

use crate::{Error, Result};

/// How many SQLite VM instructions run between deadline checks.
const PROGRESS_INTERVAL: i32 = 1_000;

/// The longest wait `busy_timeout` can express (`i32::MAX` milliseconds).
/// Longer timeouts are clamped to it.
pub const MAX_TIMEOUT: Duration = Duration::from_millis(i32::MAX as u64);

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
  at: Instant,
}

impl Deadline {
  pub fn after(timeout: Duration) -> Self {
    Self { at: Instant::now() + timeout.min(MAX_TIMEOUT) }
  }

  /// Fails with [`Error::Timeout`] if the deadline passed while the operation
  /// was queued; nothing runs in that case.
  fn arm(self, conn: &Connection) -> Result<()> {
    let remaining = self.at.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
      return Err(Error::Timeout);
    }
    conn.busy_timeout(remaining.min(MAX_TIMEOUT))?;
    let at = self.at;
    conn.progress_handler(PROGRESS_INTERVAL, Some(move || Instant::now() >= at));
    Ok(())
  }

  fn disarm(conn: &Connection) { conn.progress_handler(0, None::<fn() -> bool>); }
}

/// Run `f` against `conn` under `deadline`, outside any transaction.
pub fn read<T>(
  conn: &Connection,
  deadline: Deadline,
  f: impl FnOnce(&Connection) -> Result<T>,
) -> Result<T> {
  deadline.arm(conn)?;
  let out = f(conn);
  Deadline::disarm(conn);
  out
}

/// Run `f` inside a transaction under `deadline`: commit if it succeeds, roll
/// back and return its error if it fails.
///
/// The deadline is disarmed before commit or rollback so neither can be
/// interrupted. A failed rollback is logged; the caller still sees the error
/// that caused it.
pub fn write<T>(
  conn: &mut Connection,
  deadline: Deadline,
  op: &'static str,
  f: impl FnOnce(&Transaction<'_>) -> Result<T>,
) -> Result<T> {
  let tx = conn.transaction()?;
  let out = deadline.arm(&tx).and_then(|()| f(&tx));
  Deadline::disarm(&tx);

  match out {
    Ok(value) => {
      tx.commit()?;
      Ok(value)
    }
    Err(e) => {
      debug!(op, error = %e, "rolling back");
      if let Err(rollback) = tx.rollback() {
        warn!(op, error = %rollback, "rollback failed");
      }
      Err(e)
    }
  }
}
