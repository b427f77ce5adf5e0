//! Handlers for signup and login.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/signup` | 201; username is lower-cased |
//! | `POST` | `/api/login`  | 200 and a session cookie |

use axum::{
  Json,
  extract::State,
  http::{StatusCode, header},
  response::IntoResponse,
};
use chrono::Utc;
use filmoteka_core::{
  Error as Catalog,
  person::{NewPerson, Signup},
  store::CatalogStore,
  validate,
};
use serde::Deserialize;
use tracing::info;

use crate::{AppState, error::ApiError, gate, handlers::JsonBody, password};

// ─── Signup ──────────────────────────────────────────────────────────────────

/// `POST /api/signup`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  JsonBody(mut body): JsonBody<Signup>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  body.username = validate::normalize_username(&body.username);
  validate::signup(&body, Utc::now().date_naive())?;

  let hash = password::hash(&body.password)?;
  let person = state
    .store
    .add_person(NewPerson::from_signup(body, hash))
    .await
    .map_err(ApiError::store)?;

  info!(person_id = %person.id, username = %person.username, "person signed up");
  Ok((StatusCode::CREATED, Json("Signup successful")))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

/// `POST /api/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let username = validate::normalize_username(&body.username);
  let credentials = state
    .store
    .find_credentials(username)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| Catalog::NotFound("Username not found".into()))?;

  if !password::verify(&body.password, &credentials.password_hash) {
    return Err(ApiError::IncorrectPassword);
  }

  let token = state
    .sessions
    .issue(credentials.person_id)
    .map_err(|e| ApiError::Internal(format!("could not issue session: {e}")))?;
  let cookie =
    gate::session_set_cookie(&state.config.cookie_name, &token, state.sessions.ttl())?;

  info!(person_id = %credentials.person_id, "person logged in");
  Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json("Successfully logged in")))
}
