//! Field-bound validation, run before any storage access.
//!
//! Lengths are counted in Unicode scalar values, not bytes. Date checks take
//! `today` explicitly so callers (and tests) control the clock.

use chrono::NaiveDate;

use crate::{
  Error, Result,
  catalog::{ActorPatch, MoviePatch, NewActor, NewMovie},
  person::{NewPerson, Signup},
};

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_SEX_LEN: usize = 10;
pub const MAX_MOVIE_NAME_LEN: usize = 150;
pub const MAX_DESCRIPTION_LEN: usize = 1000;
pub const RATING_RANGE: std::ops::RangeInclusive<i16> = 0..=10;

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;
const PASSWORD_SYMBOLS: &str = "!@#$%^&*()-_=+,.?;:{}|<>";

fn chars(s: &str) -> usize { s.chars().count() }

// ─── Actors ──────────────────────────────────────────────────────────────────

fn actor_fields(
  first_name: &str,
  last_name: &str,
  sex: &str,
  birth_date: Option<NaiveDate>,
  today: NaiveDate,
) -> Result<()> {
  if chars(first_name) > MAX_NAME_LEN {
    return Err(Error::validation("Maximum firstName string length is 255 symbols"));
  }
  if chars(last_name) > MAX_NAME_LEN {
    return Err(Error::validation("Maximum lastName string length is 255 symbols"));
  }
  if chars(sex) > MAX_SEX_LEN {
    return Err(Error::validation("Maximum sex string length is 10 symbols"));
  }
  if birth_date.is_some_and(|d| d > today) {
    return Err(Error::validation("Birth date cannot be in the future"));
  }
  Ok(())
}

pub fn new_actor(actor: &NewActor, today: NaiveDate) -> Result<()> {
  actor_fields(
    &actor.first_name,
    &actor.last_name,
    &actor.sex,
    Some(actor.birth_date),
    today,
  )
}

pub fn actor_patch(patch: &ActorPatch, today: NaiveDate) -> Result<()> {
  actor_fields(
    &patch.first_name,
    &patch.last_name,
    &patch.sex,
    patch.birth_date(),
    today,
  )
}

// ─── Movies ──────────────────────────────────────────────────────────────────

fn rating(rating: i16) -> Result<()> {
  if !RATING_RANGE.contains(&rating) {
    return Err(Error::validation("Movie rating must be between 0 and 10"));
  }
  Ok(())
}

fn description(description: &str) -> Result<()> {
  if chars(description) > MAX_DESCRIPTION_LEN {
    return Err(Error::validation(
      "Movie description maximum length is 1000 characters",
    ));
  }
  Ok(())
}

/// Validates the movie fields and every actor that will be upserted with it.
pub fn new_movie(movie: &NewMovie, today: NaiveDate) -> Result<()> {
  let name_len = chars(&movie.name);
  if name_len < 1 || name_len > MAX_MOVIE_NAME_LEN {
    return Err(Error::validation(
      "Movie name must be between 1 and 150 characters long",
    ));
  }
  description(&movie.description)?;
  rating(movie.rating)?;
  for actor in &movie.actors {
    new_actor(actor, today)?;
  }
  Ok(())
}

pub fn movie_patch(patch: &MoviePatch) -> Result<()> {
  if chars(&patch.name) > MAX_MOVIE_NAME_LEN {
    return Err(Error::validation("Movie name maximum length is 150 characters"));
  }
  description(&patch.description)?;
  if let Some(r) = patch.rating {
    rating(r)?;
  }
  Ok(())
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Reject the zero id clients send when they forget to set one.
pub fn id(value: i64, what: &str) -> Result<()> {
  if value == 0 {
    return Err(Error::validation(format!("{what} id cannot be empty")));
  }
  Ok(())
}

// ─── Accounts ────────────────────────────────────────────────────────────────

/// At least three characters, ASCII letters and digits only.
pub fn is_valid_username(username: &str) -> bool {
  chars(username) >= MIN_USERNAME_LEN && username.chars().all(|c| c.is_ascii_alphanumeric())
}

/// At least eight characters drawn from letters, digits and a fixed symbol
/// set, with at least one letter and one digit.
pub fn is_valid_password(password: &str) -> bool {
  chars(password) >= MIN_PASSWORD_LEN
    && password
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c))
    && password.chars().any(|c| c.is_ascii_alphabetic())
    && password.chars().any(|c| c.is_ascii_digit())
}

/// Usernames are case-insensitive; they are stored lower-cased.
pub fn normalize_username(username: &str) -> String { username.to_lowercase() }

const USERNAME_RULE: &str =
  "Username should have at least 3 characters and consist only of English letters and digits.";

/// Username and profile of a person about to be stored. The password has
/// already been hashed by then, so it is checked in [`signup`] instead.
pub fn new_person(person: &NewPerson, today: NaiveDate) -> Result<()> {
  if !is_valid_username(&person.username) {
    return Err(Error::validation(USERNAME_RULE));
  }
  actor_fields(
    &person.first_name,
    &person.last_name,
    &person.sex,
    person.birth_date,
    today,
  )
}

pub fn signup(signup: &Signup, today: NaiveDate) -> Result<()> {
  if !is_valid_username(&signup.username) {
    return Err(Error::validation(USERNAME_RULE));
  }
  if !is_valid_password(&signup.password) {
    return Err(Error::validation(
      "Password should have at least 8 characters and include both English letters and digits. Special characters optionally.",
    ));
  }
  actor_fields(
    &signup.first_name,
    &signup.last_name,
    &signup.sex,
    signup.birth_date,
    today,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 1).unwrap() }

  fn actor(first: &str) -> NewActor {
    NewActor {
      first_name: first.into(),
      last_name:  "Tarkovsky".into(),
      sex:        "male".into(),
      birth_date: NaiveDate::from_ymd_opt(1932, 4, 4).unwrap(),
    }
  }

  #[test]
  fn actor_name_bound_counts_code_points() {
    // 255 Cyrillic letters are 510 bytes but still within the bound.
    let ok = actor(&"Ж".repeat(255));
    assert!(new_actor(&ok, today()).is_ok());

    let too_long = actor(&"Ж".repeat(256));
    assert!(matches!(new_actor(&too_long, today()), Err(Error::Validation(_))));
  }

  #[test]
  fn actor_birth_date_in_future_rejected() {
    let mut a = actor("Andrei");
    a.birth_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    assert!(matches!(new_actor(&a, today()), Err(Error::Validation(_))));
  }

  #[test]
  fn actor_sex_bound() {
    let mut a = actor("Andrei");
    a.sex = "x".repeat(11);
    assert!(new_actor(&a, today()).is_err());
  }

  #[test]
  fn empty_patch_is_valid() {
    assert!(actor_patch(&ActorPatch::default(), today()).is_ok());
    assert!(movie_patch(&MoviePatch::default()).is_ok());
  }

  #[test]
  fn movie_name_must_be_non_empty_and_bounded() {
    let mut movie = NewMovie {
      name:        String::new(),
      description: String::new(),
      date:        today(),
      rating:      5,
      actors:      vec![],
    };
    assert!(new_movie(&movie, today()).is_err());

    movie.name = "a".repeat(150);
    assert!(new_movie(&movie, today()).is_ok());

    movie.name = "a".repeat(151);
    assert!(new_movie(&movie, today()).is_err());
  }

  #[test]
  fn movie_rating_range_is_inclusive() {
    let mut movie = NewMovie {
      name:        "Mirror".into(),
      description: String::new(),
      date:        today(),
      rating:      0,
      actors:      vec![],
    };
    assert!(new_movie(&movie, today()).is_ok());
    movie.rating = 10;
    assert!(new_movie(&movie, today()).is_ok());
    movie.rating = 11;
    assert!(new_movie(&movie, today()).is_err());
    movie.rating = -1;
    assert!(new_movie(&movie, today()).is_err());
  }

  #[test]
  fn movie_validation_covers_its_actors() {
    let mut bad = actor("Andrei");
    bad.sex = "unspecified!".into();
    let movie = NewMovie {
      name:        "Mirror".into(),
      description: String::new(),
      date:        today(),
      rating:      8,
      actors:      vec![actor("Margarita"), bad],
    };
    assert!(new_movie(&movie, today()).is_err());
  }

  #[test]
  fn movie_patch_rating_checked_only_when_present() {
    let patch = MoviePatch { rating: Some(12), ..MoviePatch::default() };
    assert!(movie_patch(&patch).is_err());
  }

  #[test]
  fn zero_id_rejected() {
    assert!(id(0, "Movie").is_err());
    assert!(id(3, "Movie").is_ok());
  }

  #[test]
  fn usernames() {
    assert!(is_valid_username("test1234"));
    assert!(is_valid_username("abc"));
    assert!(!is_valid_username("ab"));
    assert!(!is_valid_username(""));
    assert!(!is_valid_username("     "));
    assert!(!is_valid_username("!@#$"));
    assert!(!is_valid_username("имя123"));
  }

  #[test]
  fn passwords() {
    assert!(is_valid_password("Test1234"));
    assert!(is_valid_password("p@ssw0rd!"));
    assert!(!is_valid_password(""));
    assert!(!is_valid_password("abc123"));
    assert!(!is_valid_password("onlyletters"));
    assert!(!is_valid_password("12345678"));
    assert!(!is_valid_password("pass word1"));
  }

  #[test]
  fn signup_rejects_short_username() {
    let s = Signup {
      username:   "ab".into(),
      password:   "Test1234".into(),
      first_name: String::new(),
      last_name:  String::new(),
      sex:        String::new(),
      birth_date: None,
    };
    assert!(matches!(signup(&s, today()), Err(Error::Validation(_))));
  }
}
