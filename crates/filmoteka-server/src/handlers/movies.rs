//! Handlers for movie endpoints and actor ↔ movie links.
//!
//! | Method   | Path | Access |
//! |----------|------|--------|
//! | `POST`   | `/api/add-movie` | admin |
//! | `PUT`    | `/api/update-movie` | admin |
//! | `DELETE` | `/api/delete-movie` | admin |
//! | `POST`   | `/api/get-movies-with-id` | admin |
//! | `POST`   | `/api/add-actor-to-movie` | admin |
//! | `DELETE` | `/api/delete-actor-from-movie` | admin |
//! | `GET`    | `/api/movies?by=&order=` | member |
//! | `POST`   | `/api/search-movie` | member |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use filmoteka_core::{
  catalog::{ActorId, Movie, MovieCriteria, MovieId, MoviePatch, NewActor, NewMovie},
  order::MovieOrder,
  store::CatalogStore,
};
use serde::Deserialize;
use tracing::info;

use crate::{
  AppState,
  error::ApiError,
  gate::{Admin, Member},
  handlers::{IdBody, JsonBody},
};

// ─── Movies ──────────────────────────────────────────────────────────────────

/// `POST /api/add-movie`: the listed actors are created if new and linked.
pub async fn add<S>(
  Admin(_): Admin,
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<NewMovie>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let movie = state.store.add_movie(body).await.map_err(ApiError::store)?;
  info!(movie_id = movie.id, actors = movie.actors.len(), "movie added");
  Ok((StatusCode::CREATED, Json("Movie added successfully")))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  #[serde(default)]
  pub id:    MovieId,
  #[serde(flatten)]
  pub patch: MoviePatch,
}

/// `PUT /api/update-movie`
pub async fn update<S>(
  Admin(_): Admin,
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<UpdateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  state
    .store
    .update_movie(body.id, body.patch)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json("Movie updated successfully")))
}

/// `DELETE /api/delete-movie`
pub async fn delete<S>(
  Admin(_): Admin,
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<IdBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  state.store.delete_movie(body.id).await.map_err(ApiError::store)?;
  info!(movie_id = body.id, "movie deleted");
  Ok((StatusCode::CREATED, Json("Movie deleted successfully")))
}

/// `POST /api/get-movies-with-id`
pub async fn search<S>(
  Admin(_): Admin,
  State(state): State<AppState<S>>,
  JsonBody(criteria): JsonBody<MovieCriteria>,
) -> Result<Json<Vec<Movie>>, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let movies = state.store.search_movies(criteria).await.map_err(ApiError::store)?;
  Ok(Json(movies))
}

// ─── Links ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LinkBody {
  #[serde(rename = "movieID", default)]
  pub movie_id: MovieId,
  #[serde(flatten)]
  pub actor:    NewActor,
}

/// `POST /api/add-actor-to-movie`
pub async fn link_actor<S>(
  Admin(_): Admin,
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LinkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let actor_id = state
    .store
    .link_actor_to_movie(body.movie_id, body.actor)
    .await
    .map_err(ApiError::store)?;
  info!(actor_id, movie_id = body.movie_id, "actor linked to movie");
  Ok((StatusCode::CREATED, Json("Actor added to movie successfully")))
}

#[derive(Debug, Deserialize)]
pub struct UnlinkBody {
  #[serde(rename = "actorID", default)]
  pub actor_id: ActorId,
  #[serde(rename = "movieID", default)]
  pub movie_id: MovieId,
}

/// `DELETE /api/delete-actor-from-movie`
pub async fn unlink_actor<S>(
  Admin(_): Admin,
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<UnlinkBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  state
    .store
    .unlink_actor_from_movie(body.actor_id, body.movie_id)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json("Actor deleted from movie successfully")))
}

// ─── Member reads ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub by:    Option<String>,
  pub order: Option<String>,
}

/// `GET /api/movies?by=name|rating|date&order=asc|desc`, defaulting to
/// rating, descending.
pub async fn list<S>(
  Member(_): Member,
  State(state): State<AppState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Movie>>, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let order = MovieOrder::from_params(params.by.as_deref(), params.order.as_deref());
  let movies = state.store.list_movies(order).await.map_err(ApiError::store)?;
  Ok(Json(movies))
}

/// `POST /api/search-movie`: matches title or cast names; each result carries
/// its full cast.
pub async fn search_with_cast<S>(
  Member(_): Member,
  State(state): State<AppState<S>>,
  JsonBody(criteria): JsonBody<MovieCriteria>,
) -> Result<Json<Vec<Movie>>, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let movies = state
    .store
    .search_movies_with_actors(criteria)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(movies))
}
