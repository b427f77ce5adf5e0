//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar dates are stored as `YYYY-MM-DD`, timestamps as RFC 3339 strings,
//! UUIDs as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use filmoteka_core::{
  aggregate::{ActorMovieRow, MovieActorRow},
  catalog::{Actor, Movie},
  person::Person,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── Dates ───────────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Column lists ────────────────────────────────────────────────────────────
//
// Every `from_row` below reads the columns in exactly this order, starting at
// the offset it is given.

pub const ACTOR_COLUMNS: &str = "a.actor_id, a.first_name, a.last_name, a.sex, a.birth_date";
pub const ACTOR_WIDTH: usize = 5;

pub const MOVIE_COLUMNS: &str =
  "m.movie_id, m.name, m.description, m.release_date, m.rating";
pub const MOVIE_WIDTH: usize = 5;

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `actor` row.
pub struct RawActor {
  pub actor_id:   i64,
  pub first_name: String,
  pub last_name:  String,
  pub sex:        String,
  pub birth_date: String,
}

impl RawActor {
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      actor_id:   row.get(at)?,
      first_name: row.get(at + 1)?,
      last_name:  row.get(at + 2)?,
      sex:        row.get(at + 3)?,
      birth_date: row.get(at + 4)?,
    })
  }

  /// `None` when the actor side of a LEFT JOIN matched nothing.
  pub fn from_joined_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Option<Self>> {
    match row.get::<_, Option<i64>>(at)? {
      Some(_) => Self::from_row(row, at).map(Some),
      None => Ok(None),
    }
  }

  pub fn into_actor(self) -> Result<Actor> {
    Ok(Actor {
      id:         self.actor_id,
      first_name: self.first_name,
      last_name:  self.last_name,
      sex:        self.sex,
      birth_date: decode_date(&self.birth_date)?,
    })
  }
}

/// Raw values read directly from a `movie` row.
pub struct RawMovie {
  pub movie_id:     i64,
  pub name:         String,
  pub description:  String,
  pub release_date: String,
  pub rating:       i16,
}

impl RawMovie {
  pub fn from_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      movie_id:     row.get(at)?,
      name:         row.get(at + 1)?,
      description:  row.get(at + 2)?,
      release_date: row.get(at + 3)?,
      rating:       row.get(at + 4)?,
    })
  }

  pub fn from_joined_row(row: &Row<'_>, at: usize) -> rusqlite::Result<Option<Self>> {
    match row.get::<_, Option<i64>>(at)? {
      Some(_) => Self::from_row(row, at).map(Some),
      None => Ok(None),
    }
  }

  pub fn into_movie(self) -> Result<Movie> {
    Ok(Movie {
      id:          self.movie_id,
      name:        self.name,
      description: self.description,
      date:        decode_date(&self.release_date)?,
      rating:      self.rating,
      actors:      Vec::new(),
    })
  }
}

/// One row of `movie LEFT JOIN actor_movie LEFT JOIN actor`, selected as
/// `MOVIE_COLUMNS, ACTOR_COLUMNS`.
pub struct RawMovieActor {
  pub movie: RawMovie,
  pub actor: Option<RawActor>,
}

impl RawMovieActor {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      movie: RawMovie::from_row(row, 0)?,
      actor: RawActor::from_joined_row(row, MOVIE_WIDTH)?,
    })
  }

  pub fn into_row(self) -> Result<MovieActorRow> {
    Ok(MovieActorRow {
      movie: self.movie.into_movie()?,
      actor: self.actor.map(RawActor::into_actor).transpose()?,
    })
  }
}

/// One row of `actor LEFT JOIN actor_movie LEFT JOIN movie`, selected as
/// `ACTOR_COLUMNS, MOVIE_COLUMNS`.
pub struct RawActorMovie {
  pub actor: RawActor,
  pub movie: Option<RawMovie>,
}

impl RawActorMovie {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      actor: RawActor::from_row(row, 0)?,
      movie: RawMovie::from_joined_row(row, ACTOR_WIDTH)?,
    })
  }

  pub fn into_row(self) -> Result<ActorMovieRow> {
    Ok(ActorMovieRow {
      actor: self.actor.into_actor()?,
      movie: self.movie.map(RawMovie::into_movie).transpose()?,
    })
  }
}

/// Raw values read directly from a `person` row (minus the password hash).
pub struct RawPerson {
  pub person_id:  String,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  pub sex:        String,
  pub birth_date: Option<String>,
  pub is_admin:   bool,
  pub created_at: String,
}

impl RawPerson {
  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:         decode_uuid(&self.person_id)?,
      username:   self.username,
      first_name: self.first_name,
      last_name:  self.last_name,
      sex:        self.sex,
      birth_date: self.birth_date.as_deref().map(decode_date).transpose()?,
      is_admin:   self.is_admin,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_round_trip_as_iso_text() {
    let d = NaiveDate::from_ymd_opt(1979, 5, 25).unwrap();
    assert_eq!(encode_date(d), "1979-05-25");
    assert_eq!(decode_date("1979-05-25").unwrap(), d);
  }

  #[test]
  fn garbage_date_is_a_parse_error() {
    assert!(matches!(decode_date("25/05/1979"), Err(Error::DateParse(_))));
  }
}
