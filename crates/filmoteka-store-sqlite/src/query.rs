//! SQL text for the read queries.
//!
//! User input never reaches the SQL text: the sort column and direction come
//! from closed enums, and every filter value is bound as a parameter.

use filmoteka_core::{
  catalog::{ActorCriteria, MovieCriteria},
  order::{Direction, MovieOrder, SortField},
};
use rusqlite::types::Value;

use crate::encode::{ACTOR_COLUMNS, MOVIE_COLUMNS, encode_date};

// ─── Predicates ──────────────────────────────────────────────────────────────

/// A list of OR-combined predicates and their positional parameters.
///
/// A criterion that was not supplied (empty string, `None`) adds nothing, so
/// every extra criterion widens the match.
#[derive(Debug, Default)]
pub struct Predicates {
  clauses: Vec<String>,
  params:  Vec<Value>,
}

impl Predicates {
  pub fn new() -> Self { Self::default() }

  fn push(&mut self, clause: String, param: Value) -> &mut Self {
    self.clauses.push(clause);
    self.params.push(param);
    self
  }

  /// `column` contains `needle` as a substring.
  pub fn contains(&mut self, column: &str, needle: &str) -> &mut Self {
    if needle.is_empty() {
      return self;
    }
    self.push(format!("{column} LIKE ? ESCAPE '\\'"), like_pattern(needle))
  }

  /// `column` equals `value` exactly.
  pub fn equals(&mut self, column: &str, value: Option<impl Into<Value>>) -> &mut Self {
    match value {
      Some(v) => self.push(format!("{column} = ?"), v.into()),
      None => self,
    }
  }

  /// The movie `m` has at least one actor whose `column` contains `needle`.
  pub fn cast_contains(&mut self, column: &str, needle: &str) -> &mut Self {
    if needle.is_empty() {
      return self;
    }
    self.push(
      format!(
        "EXISTS (SELECT 1 FROM actor_movie am JOIN actor a ON a.actor_id = am.actor_id \
         WHERE am.movie_id = m.movie_id AND a.{column} LIKE ? ESCAPE '\\')"
      ),
      like_pattern(needle),
    )
  }

  pub fn is_empty(&self) -> bool { self.clauses.is_empty() }

  /// ` WHERE (p1) OR (p2) ...`, or the empty string when there are none.
  pub fn where_clause(&self) -> String {
    if self.clauses.is_empty() {
      return String::new();
    }
    let joined = self
      .clauses
      .iter()
      .map(|c| format!("({c})"))
      .collect::<Vec<_>>()
      .join(" OR ");
    format!(" WHERE {joined}")
  }

  pub fn into_params(self) -> Vec<Value> { self.params }
}

/// `%needle%` with LIKE metacharacters in `needle` escaped.
fn like_pattern(needle: &str) -> Value {
  let mut pattern = String::with_capacity(needle.len() + 2);
  pattern.push('%');
  for c in needle.chars() {
    if matches!(c, '\\' | '%' | '_') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  Value::Text(pattern)
}

// ─── Criteria → predicates ───────────────────────────────────────────────────

pub fn actor_predicates(c: &ActorCriteria) -> Predicates {
  let mut p = Predicates::new();
  p.contains("a.first_name", &c.first_name)
    .contains("a.last_name", &c.last_name)
    .equals("a.sex", (!c.sex.is_empty()).then(|| c.sex.clone()))
    .equals("a.birth_date", c.birth_date.map(encode_date));
  p
}

/// Every field of the criteria, for the admin movie search.
pub fn movie_predicates(c: &MovieCriteria) -> Predicates {
  let mut p = Predicates::new();
  p.contains("m.name", &c.name)
    .contains("m.description", &c.description)
    .equals("m.release_date", c.date.map(encode_date))
    .equals("m.rating", c.rating.map(i64::from))
    .cast_contains("first_name", &c.actor_first_name)
    .cast_contains("last_name", &c.actor_last_name);
  p
}

/// Title and cast names only, for the member-facing search.
pub fn title_or_cast_predicates(c: &MovieCriteria) -> Predicates {
  let mut p = Predicates::new();
  p.contains("m.name", &c.name)
    .cast_contains("first_name", &c.actor_first_name)
    .cast_contains("last_name", &c.actor_last_name);
  p
}

// ─── Statements ──────────────────────────────────────────────────────────────

const MOVIES_WITH_CAST: &str = "FROM movie m
     LEFT JOIN actor_movie am ON am.movie_id = m.movie_id
     LEFT JOIN actor a        ON a.actor_id  = am.actor_id";

/// Every movie with its cast, one row per (movie, actor).
///
/// Rows of one movie must stay adjacent for aggregation, so the caller's
/// ordering is always followed by the grouping key and then the ids.
pub fn movie_list(order: MovieOrder) -> String {
  let column = match order.by {
    SortField::Name => "m.name",
    SortField::Rating => "m.rating",
    SortField::Date => "m.release_date",
  };
  let direction = match order.direction {
    Direction::Asc => "ASC",
    Direction::Desc => "DESC",
  };
  format!(
    "SELECT {MOVIE_COLUMNS}, {ACTOR_COLUMNS}
     {MOVIES_WITH_CAST}
     ORDER BY {column} {direction}, m.name, m.release_date, m.movie_id, a.actor_id"
  )
}

/// Movies matching `filter` (built from [`title_or_cast_predicates`]), each
/// with its full cast.
pub fn movie_search_with_cast(filter: &Predicates) -> String {
  format!(
    "SELECT {MOVIE_COLUMNS}, {ACTOR_COLUMNS}
     {MOVIES_WITH_CAST}
     WHERE m.movie_id IN (SELECT m.movie_id FROM movie m{where_clause})
     ORDER BY m.name, m.release_date, m.movie_id, a.actor_id",
    where_clause = filter.where_clause(),
  )
}

pub fn movie_search(filter: &Predicates) -> String {
  format!(
    "SELECT {MOVIE_COLUMNS} FROM movie m{where_clause} ORDER BY m.movie_id",
    where_clause = filter.where_clause(),
  )
}

pub fn actor_search(filter: &Predicates) -> String {
  format!(
    "SELECT {ACTOR_COLUMNS} FROM actor a{where_clause} ORDER BY a.actor_id",
    where_clause = filter.where_clause(),
  )
}

pub fn actor_list_with_movies() -> String {
  format!(
    "SELECT {ACTOR_COLUMNS}, {MOVIE_COLUMNS}
     FROM actor a
     LEFT JOIN actor_movie am ON am.actor_id = a.actor_id
     LEFT JOIN movie m        ON m.movie_id  = am.movie_id
     ORDER BY a.actor_id, m.movie_id"
  )
}
