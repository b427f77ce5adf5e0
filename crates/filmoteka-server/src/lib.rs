//! HTTP API for the Filmoteka catalog.
//!
//! Exposes an axum [`Router`] backed by any [`CatalogStore`]. Sessions are
//! signed cookies checked by the extractors in [`gate`].

pub mod error;
pub mod gate;
pub mod handlers;
pub mod password;
pub mod session;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use filmoteka_core::store::CatalogStore;
use serde::Deserialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;

use handlers::{accounts, actors, movies};
use session::SessionCodec;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `filmoteka.toml` and
/// `FILMOTEKA_*` environment variables. Only `session_secret` is required.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  /// Upper bound on any single database operation.
  #[serde(default = "default_query_timeout_secs")]
  pub query_timeout_secs: u64,
  /// HMAC key for session tokens.
  pub session_secret:     String,
  #[serde(default = "default_cookie_name")]
  pub cookie_name:        String,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours:  u64,
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("filmoteka.db") }
fn default_query_timeout_secs() -> u64 { 5 }
fn default_cookie_name() -> String { "jwt".into() }
fn default_session_ttl_hours() -> u64 { 24 * 30 }

const MAX_QUERY_TIMEOUT_SECS: u64 = 3600;
const MAX_SESSION_TTL_HOURS: u64 = 24 * 365;

/// A configuration that deserialised but cannot be served with.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("session_secret must not be empty")]
  EmptySecret,
  #[error("query_timeout_secs must be between 1 and 3600")]
  QueryTimeout,
  #[error("session_ttl_hours must be between 1 and 8760")]
  SessionTtl,
}

impl ServerConfig {
  /// Reject values the server must not start with.
  pub fn check(&self) -> Result<(), ConfigError> {
    if self.session_secret.is_empty() {
      return Err(ConfigError::EmptySecret);
    }
    if !(1..=MAX_QUERY_TIMEOUT_SECS).contains(&self.query_timeout_secs) {
      return Err(ConfigError::QueryTimeout);
    }
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&self.session_ttl_hours) {
      return Err(ConfigError::SessionTtl);
    }
    Ok(())
  }

  pub fn query_timeout(&self) -> Duration { Duration::from_secs(self.query_timeout_secs) }

  pub fn session_ttl(&self) -> Duration {
    Duration::from_secs(self.session_ttl_hours.saturating_mul(3600))
  }
}

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: CatalogStore> {
  pub store:    Arc<S>,
  pub config:   Arc<ServerConfig>,
  pub sessions: Arc<SessionCodec>,
}

impl<S: CatalogStore> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    let sessions = SessionCodec::new(config.session_secret.as_bytes(), config.session_ttl());
    Self {
      store:    Arc::new(store),
      config:   Arc::new(config),
      sessions: Arc::new(sessions),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] serving every route under `/api`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: CatalogStore + Clone + 'static,
{
  let api = Router::new()
    // Accounts
    .route("/signup",                  post(accounts::signup::<S>))
    .route("/login",                   post(accounts::login::<S>))
    // Actors
    .route("/add-actor",               post(actors::add::<S>))
    .route("/update-actor",            put(actors::update::<S>))
    .route("/delete-actor",            delete(actors::delete::<S>))
    .route("/get-actors-with-id",      post(actors::search::<S>))
    .route("/actors",                  get(actors::list::<S>))
    // Movies
    .route("/add-movie",               post(movies::add::<S>))
    .route("/update-movie",            put(movies::update::<S>))
    .route("/delete-movie",            delete(movies::delete::<S>))
    .route("/get-movies-with-id",      post(movies::search::<S>))
    .route("/add-actor-to-movie",      post(movies::link_actor::<S>))
    .route("/delete-actor-from-movie", delete(movies::unlink_actor::<S>))
    .route("/movies",                  get(movies::list::<S>))
    .route("/search-movie",            post(movies::search_with_cast::<S>));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
