//! People: the accounts that sign in to the catalog.
//!
//! A person's identifier doubles as the session subject. People are created
//! once at signup and never changed by this crate; the admin flag is granted
//! out of band.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PersonId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
  pub id:         PersonId,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
  pub sex:        String,
  pub birth_date: Option<NaiveDate>,
  pub is_admin:   bool,
  pub created_at: DateTime<Utc>,
}

/// The signup request as submitted by the client. `password` is plaintext
/// and must be hashed before it reaches a store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
  #[serde(default)]
  pub username:   String,
  #[serde(default)]
  pub password:   String,
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name:  String,
  #[serde(default)]
  pub sex:        String,
  #[serde(default)]
  pub birth_date: Option<NaiveDate>,
}

/// Input to [`crate::store::CatalogStore::add_person`].
#[derive(Debug, Clone)]
pub struct NewPerson {
  pub username:      String,
  /// PHC string, e.g. `$argon2id$v=19$…`.
  pub password_hash: String,
  pub first_name:    String,
  pub last_name:     String,
  pub sex:           String,
  pub birth_date:    Option<NaiveDate>,
}

impl NewPerson {
  /// Combine a validated signup with the hash of its password.
  pub fn from_signup(signup: Signup, password_hash: String) -> Self {
    Self {
      username: signup.username,
      password_hash,
      first_name: signup.first_name,
      last_name: signup.last_name,
      sex: signup.sex,
      birth_date: signup.birth_date,
    }
  }
}

/// What a login needs from the store.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub person_id:     PersonId,
  pub password_hash: String,
}
