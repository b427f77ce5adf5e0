//! Catalog types: actors, movies, and the inputs that create or change them.
//!
//! Actors are identified in two ways. The surrogate [`ActorId`] is assigned
//! by the store; the natural key `(first_name, last_name, birth_date)` is the
//! identity the store reconciles on when the same person is submitted twice.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type ActorId = i64;
pub type MovieId = i64;

// ─── Actors ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
  pub id:         ActorId,
  pub first_name: String,
  pub last_name:  String,
  pub sex:        String,
  pub birth_date: NaiveDate,
}

/// Input to [`crate::store::CatalogStore::add_actor`] and the actor half of
/// every upsert-and-link operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewActor {
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name:  String,
  #[serde(default)]
  pub sex:        String,
  pub birth_date: NaiveDate,
}

impl NewActor {
  /// The natural key the store deduplicates on.
  pub fn natural_key(&self) -> (&str, &str, NaiveDate) {
    (&self.first_name, &self.last_name, self.birth_date)
  }
}

/// Partial replacement for an actor. Empty strings and an absent (or zero)
/// date leave the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorPatch {
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name:  String,
  #[serde(default)]
  pub sex:        String,
  #[serde(default)]
  pub birth_date: Option<NaiveDate>,
}

impl ActorPatch {
  pub fn birth_date(&self) -> Option<NaiveDate> { set_date(self.birth_date) }
}

/// An actor together with every movie they appear in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorWithMovies {
  #[serde(flatten)]
  pub actor:  Actor,
  pub movies: Vec<Movie>,
}

// ─── Movies ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
  pub id:          MovieId,
  pub name:        String,
  pub description: String,
  /// Release date.
  pub date:        NaiveDate,
  pub rating:      i16,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub actors:      Vec<Actor>,
}

impl Movie {
  /// The key join rows are grouped on when nesting actors under movies.
  pub fn grouping_key(&self) -> (&str, NaiveDate) { (&self.name, self.date) }
}

/// Input to [`crate::store::CatalogStore::add_movie`]. Each entry in `actors`
/// is upserted by natural key and linked to the new movie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
  #[serde(default)]
  pub name:        String,
  #[serde(default)]
  pub description: String,
  pub date:        NaiveDate,
  #[serde(default)]
  pub rating:      i16,
  #[serde(default)]
  pub actors:      Vec<NewActor>,
}

/// Partial replacement for a movie, with the same "empty means unchanged"
/// convention as [`ActorPatch`]. An absent rating is left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePatch {
  #[serde(default)]
  pub name:        String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub date:        Option<NaiveDate>,
  #[serde(default)]
  pub rating:      Option<i16>,
}

impl MoviePatch {
  pub fn date(&self) -> Option<NaiveDate> { set_date(self.date) }
}

// ─── Search criteria ─────────────────────────────────────────────────────────

/// Optional filters for actor search. Supplied criteria are OR-combined:
/// every additional criterion widens the result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorCriteria {
  /// Substring of the first name.
  #[serde(default)]
  pub first_name: String,
  /// Substring of the last name.
  #[serde(default)]
  pub last_name:  String,
  /// Exact sex.
  #[serde(default)]
  pub sex:        String,
  #[serde(default)]
  pub birth_date: Option<NaiveDate>,
}

/// Optional filters for movie search, OR-combined like [`ActorCriteria`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieCriteria {
  #[serde(default)]
  pub name:             String,
  #[serde(default)]
  pub description:      String,
  #[serde(default)]
  pub date:             Option<NaiveDate>,
  #[serde(default)]
  pub rating:           Option<i16>,
  /// Matches movies with at least one actor whose first name contains this.
  #[serde(default)]
  pub actor_first_name: String,
  #[serde(default)]
  pub actor_last_name:  String,
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// `0001-01-01` is the zero date older clients send for "not set".
fn set_date(date: Option<NaiveDate>) -> Option<NaiveDate> {
  date.filter(|d| Some(*d) != NaiveDate::from_ymd_opt(1, 1, 1))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn movie_json_uses_camel_case_and_omits_empty_actors() {
    let movie = Movie {
      id:          7,
      name:        "Solaris".into(),
      description: "Ocean".into(),
      date:        date(1972, 3, 20),
      rating:      9,
      actors:      vec![],
    };
    let json = serde_json::to_value(&movie).unwrap();
    assert_eq!(json["date"], "1972-03-20");
    assert!(json.get("actors").is_none());
  }

  #[test]
  fn actor_with_movies_flattens_actor_fields() {
    let value = ActorWithMovies {
      actor:  Actor {
        id:         1,
        first_name: "Natalya".into(),
        last_name:  "Bondarchuk".into(),
        sex:        "female".into(),
        birth_date: date(1950, 5, 10),
      },
      movies: vec![],
    };
    let json = serde_json::to_value(&value).unwrap();
    assert_eq!(json["firstName"], "Natalya");
    assert_eq!(json["birthDate"], "1950-05-10");
    assert_eq!(json["movies"], serde_json::json!([]));
  }

  #[test]
  fn patch_treats_zero_date_as_unset() {
    let patch: ActorPatch =
      serde_json::from_str(r#"{"birthDate":"0001-01-01"}"#).unwrap();
    assert_eq!(patch.birth_date(), None);

    let patch: ActorPatch =
      serde_json::from_str(r#"{"birthDate":"1980-02-03"}"#).unwrap();
    assert_eq!(patch.birth_date(), Some(date(1980, 2, 3)));
  }

  #[test]
  fn new_movie_defaults_missing_actors_to_empty() {
    let movie: NewMovie =
      serde_json::from_str(r#"{"name":"Stalker","date":"1979-05-25","rating":8}"#)
        .unwrap();
    assert!(movie.actors.is_empty());
    assert_eq!(movie.description, "");
  }
}
