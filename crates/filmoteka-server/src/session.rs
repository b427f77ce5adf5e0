//! Signed session tokens.
//!
//! A session is an HS256 JWT carrying the person's id (`iss`) and an expiry
//! (`exp`). Verification needs only the secret; it never touches the store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use filmoteka_core::person::PersonId;
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
  #[error("session token signature is invalid")]
  InvalidSignature,
  #[error("session token has expired")]
  Expired,
  #[error("session token is malformed")]
  Malformed,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
  /// The person id, hyphenated.
  iss: String,
  /// Unix seconds.
  exp: i64,
}

/// Issues and verifies session tokens with one process-wide secret.
pub struct SessionCodec {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        Duration,
}

impl SessionCodec {
  pub fn new(secret: &[u8], ttl: Duration) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
      ttl,
    }
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  /// A token for `subject` that expires one TTL from now.
  pub fn issue(&self, subject: PersonId) -> Result<String, SessionError> {
    let ttl = chrono::Duration::from_std(self.ttl).map_err(|_| SessionError::Malformed)?;
    self.issue_until(subject, Utc::now() + ttl)
  }

  pub fn issue_until(
    &self,
    subject: PersonId,
    expires_at: DateTime<Utc>,
  ) -> Result<String, SessionError> {
    let claims = Claims { iss: subject.hyphenated().to_string(), exp: expires_at.timestamp() };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(|_| SessionError::Malformed)
  }

  /// The subject of a valid, unexpired token.
  pub fn verify(&self, token: &str) -> Result<PersonId, SessionError> {
    let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
      match e.kind() {
        ErrorKind::InvalidSignature => SessionError::InvalidSignature,
        ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::Malformed,
      }
    })?;
    PersonId::parse_str(&data.claims.iss).map_err(|_| SessionError::Malformed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  fn codec(secret: &str) -> SessionCodec {
    SessionCodec::new(secret.as_bytes(), Duration::from_secs(3600))
  }

  #[test]
  fn issued_token_verifies_to_its_subject() {
    let codec = codec("secret");
    let subject = Uuid::new_v4();
    let token = codec.issue(subject).unwrap();
    assert_eq!(codec.verify(&token), Ok(subject));
  }

  #[test]
  fn wrong_secret_is_invalid_signature() {
    let token = codec("secret").issue(Uuid::new_v4()).unwrap();
    assert_eq!(codec("other").verify(&token), Err(SessionError::InvalidSignature));
  }

  #[test]
  fn past_expiry_is_expired() {
    let codec = codec("secret");
    let token = codec
      .issue_until(Uuid::new_v4(), Utc::now() - chrono::Duration::hours(1))
      .unwrap();
    assert_eq!(codec.verify(&token), Err(SessionError::Expired));
  }

  #[test]
  fn garbage_is_malformed() {
    assert_eq!(codec("secret").verify(""), Err(SessionError::Malformed));
    assert_eq!(codec("secret").verify("not.a.jwt"), Err(SessionError::Malformed));
  }

  #[test]
  fn non_uuid_subject_is_malformed() {
    let codec = codec("secret");
    let claims = Claims { iss: "42".into(), exp: Utc::now().timestamp() + 60 };
    let token = encode(&Header::default(), &claims, &codec.encoding).unwrap();
    assert_eq!(codec.verify(&token), Err(SessionError::Malformed));
  }
}
