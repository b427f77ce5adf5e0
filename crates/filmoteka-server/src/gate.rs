//! Authentication and authorization for API handlers.
//!
//! Each request moves through the same checks in order, stopping at the
//! first failure:
//!
//! 1. a session cookie is present and its token verifies ([`ApiError::Unauthenticated`]);
//! 2. the token's subject exists ([`ApiError::Unauthorized`]);
//! 3. for admin routes, the subject is an admin ([`ApiError::Forbidden`]).
//!
//! [`admit`] implements the checks; [`Member`] and [`Admin`] run them as axum
//! extractors. Extractors run before the body is read, so a request that is
//! both unauthenticated and malformed is reported as unauthenticated.

use std::time::Duration;

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, HeaderValue, header, request::Parts},
};
use filmoteka_core::{
  person::PersonId,
  store::{CatalogStore, PrivilegeOracle},
};
use cookie::Cookie;
use tracing::warn;

use crate::{AppState, error::ApiError, session::SessionCodec};

/// What a route requires of its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
  /// Any existing person.
  Member,
  /// An existing person with the admin flag set.
  Admin,
}

/// Run the gate for `token` and return the admitted subject.
pub async fn admit<O: PrivilegeOracle>(
  sessions: &SessionCodec,
  oracle: &O,
  token: Option<&str>,
  access: Access,
) -> Result<PersonId, ApiError> {
  let token = token.ok_or(ApiError::Unauthenticated)?;
  let subject = sessions.verify(token).map_err(|e| {
    warn!(error = %e, "session rejected");
    ApiError::Unauthenticated
  })?;

  if !oracle.person_exists(subject).await.map_err(ApiError::store)? {
    warn!(%subject, "session for unknown person");
    return Err(ApiError::Unauthorized);
  }

  if access == Access::Admin && !oracle.is_admin(subject).await.map_err(ApiError::store)? {
    warn!(%subject, "admin route refused");
    return Err(ApiError::Forbidden);
  }

  Ok(subject)
}

// ─── Cookies ─────────────────────────────────────────────────────────────────

/// The value of cookie `name`, if the request carries one. Surrounding
/// double quotes are stripped.
pub fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| Cookie::split_parse(v))
    .filter_map(Result::ok)
    .find(|c| c.name() == name)
    .map(|c| c.value_trimmed().to_owned())
}

/// `Set-Cookie` value for a fresh session.
pub fn session_set_cookie(name: &str, token: &str, ttl: Duration) -> Result<HeaderValue, ApiError> {
  let max_age = cookie::time::Duration::try_from(ttl)
    .map_err(|e| ApiError::Internal(format!("invalid session lifetime: {e}")))?;
  let session = Cookie::build((name, token))
    .max_age(max_age)
    .path("/")
    .http_only(true)
    .build();
  HeaderValue::from_str(&session.to_string())
    .map_err(|e| ApiError::Internal(format!("invalid cookie: {e}")))
}

// ─── Extractors ──────────────────────────────────────────────────────────────

/// An authenticated caller whose person record exists.
pub struct Member(pub PersonId);

/// An authenticated caller with admin privileges.
pub struct Admin(pub PersonId);

async fn admit_request<S: CatalogStore>(
  parts: &Parts,
  state: &AppState<S>,
  access: Access,
) -> Result<PersonId, ApiError> {
  let token = session_cookie(&parts.headers, &state.config.cookie_name);
  admit(&state.sessions, state.store.as_ref(), token.as_deref(), access).await
}

impl<S> FromRequestParts<AppState<S>> for Member
where
  S: CatalogStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    admit_request(parts, state, Access::Member).await.map(Member)
  }
}

impl<S> FromRequestParts<AppState<S>> for Admin
where
  S: CatalogStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    admit_request(parts, state, Access::Admin).await.map(Admin)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use filmoteka_core::Error as Catalog;
  use uuid::Uuid;

  #[derive(Default)]
  struct Oracle {
    members: Vec<PersonId>,
    admins:  Vec<PersonId>,
    down:    bool,
  }

  impl PrivilegeOracle for Oracle {
    type Error = Catalog;

    async fn person_exists(&self, id: PersonId) -> Result<bool, Catalog> {
      if self.down {
        return Err(Catalog::Timeout);
      }
      Ok(self.members.contains(&id) || self.admins.contains(&id))
    }

    async fn is_admin(&self, id: PersonId) -> Result<bool, Catalog> {
      if self.admins.contains(&id) {
        Ok(true)
      } else if self.members.contains(&id) {
        Ok(false)
      } else {
        Err(Catalog::NotFound("Person not found".into()))
      }
    }
  }

  fn sessions() -> SessionCodec { SessionCodec::new(b"secret", Duration::from_secs(60)) }

  #[tokio::test]
  async fn missing_token_is_unauthenticated() {
    let res = admit(&sessions(), &Oracle::default(), None, Access::Member).await;
    assert!(matches!(res, Err(ApiError::Unauthenticated)));
  }

  #[tokio::test]
  async fn bad_token_is_unauthenticated() {
    let res = admit(&sessions(), &Oracle::default(), Some("junk"), Access::Member).await;
    assert!(matches!(res, Err(ApiError::Unauthenticated)));
  }

  #[tokio::test]
  async fn unknown_subject_is_unauthorized() {
    let s = sessions();
    let token = s.issue(Uuid::new_v4()).unwrap();
    let res = admit(&s, &Oracle::default(), Some(&token), Access::Member).await;
    assert!(matches!(res, Err(ApiError::Unauthorized)));
  }

  #[tokio::test]
  async fn member_on_admin_route_is_forbidden() {
    let s = sessions();
    let id = Uuid::new_v4();
    let oracle = Oracle { members: vec![id], ..Oracle::default() };
    let token = s.issue(id).unwrap();

    assert_eq!(admit(&s, &oracle, Some(&token), Access::Member).await.unwrap(), id);
    let res = admit(&s, &oracle, Some(&token), Access::Admin).await;
    assert!(matches!(res, Err(ApiError::Forbidden)));
  }

  #[tokio::test]
  async fn admin_is_admitted_everywhere() {
    let s = sessions();
    let id = Uuid::new_v4();
    let oracle = Oracle { admins: vec![id], ..Oracle::default() };
    let token = s.issue(id).unwrap();
    assert_eq!(admit(&s, &oracle, Some(&token), Access::Admin).await.unwrap(), id);
  }

  #[tokio::test]
  async fn oracle_failure_is_reported_as_is() {
    let s = sessions();
    let token = s.issue(Uuid::new_v4()).unwrap();
    let oracle = Oracle { down: true, ..Oracle::default() };
    let res = admit(&s, &oracle, Some(&token), Access::Member).await;
    assert!(matches!(res, Err(ApiError::Catalog(Catalog::Timeout))));
  }

  #[test]
  fn cookie_is_found_among_others() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; jwt=abc.def; x=1"));
    assert_eq!(session_cookie(&headers, "jwt").as_deref(), Some("abc.def"));
    assert_eq!(session_cookie(&headers, "missing"), None);
  }

  #[test]
  fn quoted_cookie_value_is_unquoted() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, HeaderValue::from_static("jwt=\"abc.def.ghi\""));
    assert_eq!(session_cookie(&headers, "jwt").as_deref(), Some("abc.def.ghi"));
  }

  #[tokio::test]
  async fn quoted_session_cookie_is_admitted() {
    let s = sessions();
    let id = Uuid::new_v4();
    let oracle = Oracle { members: vec![id], ..Oracle::default() };
    let mut headers = HeaderMap::new();
    let quoted = format!("jwt=\"{}\"", s.issue(id).unwrap());
    headers.insert(header::COOKIE, HeaderValue::from_str(&quoted).unwrap());

    let token = session_cookie(&headers, "jwt");
    let admitted = admit(&s, &oracle, token.as_deref(), Access::Member).await.unwrap();
    assert_eq!(admitted, id);
  }

  #[test]
  fn set_cookie_carries_lifetime_and_flags() {
    let value = session_set_cookie("jwt", "tok", Duration::from_secs(3600)).unwrap();
    let parsed = Cookie::parse(value.to_str().unwrap().to_owned()).unwrap();
    assert_eq!(parsed.name(), "jwt");
    assert_eq!(parsed.value(), "tok");
    assert_eq!(parsed.max_age(), Some(cookie::time::Duration::hours(1)));
    assert_eq!(parsed.path(), Some("/"));
    assert_eq!(parsed.http_only(), Some(true));
  }
}
