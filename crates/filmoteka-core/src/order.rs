//! Caller-selected ordering for the movie list.

use serde::{Deserialize, Serialize};

/// The column the movie list is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
  Name,
  #[default]
  Rating,
  Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Asc,
  #[default]
  Desc,
}

impl SortField {
  /// Unrecognised or missing values fall back to [`SortField::Rating`].
  pub fn parse_or_default(s: Option<&str>) -> Self {
    match s {
      Some("name") => Self::Name,
      Some("rating") => Self::Rating,
      Some("date") => Self::Date,
      _ => Self::default(),
    }
  }
}

impl Direction {
  /// Unrecognised or missing values fall back to [`Direction::Desc`].
  pub fn parse_or_default(s: Option<&str>) -> Self {
    match s {
      Some("asc") => Self::Asc,
      Some("desc") => Self::Desc,
      _ => Self::default(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovieOrder {
  pub by:        SortField,
  pub direction: Direction,
}

impl MovieOrder {
  /// Build from the raw `by` / `order` query parameters.
  pub fn from_params(by: Option<&str>, order: Option<&str>) -> Self {
    Self {
      by:        SortField::parse_or_default(by),
      direction: Direction::parse_or_default(order),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recognised_params() {
    let order = MovieOrder::from_params(Some("name"), Some("asc"));
    assert_eq!(order.by, SortField::Name);
    assert_eq!(order.direction, Direction::Asc);

    let order = MovieOrder::from_params(Some("date"), Some("desc"));
    assert_eq!(order.by, SortField::Date);
    assert_eq!(order.direction, Direction::Desc);
  }

  #[test]
  fn unrecognised_params_default_to_rating_desc() {
    let order = MovieOrder::from_params(Some("popularity"), Some("sideways"));
    assert_eq!(order, MovieOrder { by: SortField::Rating, direction: Direction::Desc });

    assert_eq!(MovieOrder::from_params(None, None), MovieOrder::default());
  }

  #[test]
  fn params_are_case_sensitive() {
    let order = MovieOrder::from_params(Some("NAME"), Some("ASC"));
    assert_eq!(order, MovieOrder::default());
  }
}
