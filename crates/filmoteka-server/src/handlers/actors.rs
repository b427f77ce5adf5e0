//! Handlers for actor endpoints.
//!
//! | Method   | Path | Access |
//! |----------|------|--------|
//! | `POST`   | `/api/add-actor` | admin |
//! | `PUT`    | `/api/update-actor` | admin |
//! | `DELETE` | `/api/delete-actor` | admin |
//! | `POST`   | `/api/get-actors-with-id` | admin |
//! | `GET`    | `/api/actors` | member |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use filmoteka_core::{
  catalog::{Actor, ActorCriteria, ActorId, ActorPatch, ActorWithMovies, NewActor},
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

/// `POST /api/add-actor`
pub async fn add<S>(
  Admin(_): Admin,
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<NewActor>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let actor = state.store.add_actor(body).await.map_err(ApiError::store)?;
  info!(actor_id = actor.id, "actor added");
  Ok((StatusCode::CREATED, Json("Actor added successfully")))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBody {
  #[serde(default)]
  pub id:    ActorId,
  #[serde(flatten)]
  pub patch: ActorPatch,
}

/// `PUT /api/update-actor`: fields left empty keep their stored value.
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
    .update_actor(body.id, body.patch)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json("Actor updated successfully")))
}

/// `DELETE /api/delete-actor`: also removes the actor from every movie.
pub async fn delete<S>(
  Admin(_): Admin,
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<IdBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  state.store.delete_actor(body.id).await.map_err(ApiError::store)?;
  info!(actor_id = body.id, "actor deleted");
  Ok((StatusCode::CREATED, Json("Actor deleted successfully")))
}

/// `POST /api/get-actors-with-id`
pub async fn search<S>(
  Admin(_): Admin,
  State(state): State<AppState<S>>,
  JsonBody(criteria): JsonBody<ActorCriteria>,
) -> Result<Json<Vec<Actor>>, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let actors = state.store.search_actors(criteria).await.map_err(ApiError::store)?;
  Ok(Json(actors))
}

/// `GET /api/actors`: every actor with the movies they appear in.
pub async fn list<S>(
  Member(_): Member,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<ActorWithMovies>>, ApiError>
where
  S: CatalogStore + Clone + 'static,
{
  let actors = state.store.list_actors_with_movies().await.map_err(ApiError::store)?;
  Ok(Json(actors))
}
