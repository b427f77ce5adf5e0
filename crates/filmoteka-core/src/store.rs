//! The store traits and their calling conventions.
//!
//! [`PrivilegeOracle`] answers "who is this subject and may they administer
//! the catalog"; [`CatalogStore`] owns every write to actors, movies and their
//! links, plus the read queries. Backends (e.g. `filmoteka-store-sqlite`)
//! implement both; the HTTP layer depends only on these traits.
//!
//! All methods return `Send` futures so the traits can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use crate::{
  catalog::{
    Actor, ActorCriteria, ActorId, ActorPatch, ActorWithMovies, Movie,
    MovieCriteria, MovieId, MoviePatch, NewActor, NewMovie,
  },
  order::MovieOrder,
  person::{Credentials, NewPerson, Person, PersonId},
};

// ─── Privilege ───────────────────────────────────────────────────────────────

/// Single-row lookups of a person's existence and admin flag.
///
/// Callers must check [`person_exists`](Self::person_exists) before
/// [`is_admin`](Self::is_admin): the latter treats a missing row as an error
/// and cannot distinguish "unknown subject" from "not an admin".
pub trait PrivilegeOracle: Send + Sync {
  type Error: std::error::Error + Send + Sync + Into<crate::Error> + 'static;

  fn person_exists(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn is_admin(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Catalog ─────────────────────────────────────────────────────────────────

/// Abstraction over a catalog backend.
///
/// Every mutating method validates its input before touching storage and runs
/// inside a single transaction: either all of its statements take effect or
/// none do.
pub trait CatalogStore: PrivilegeOracle {
  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new person with the admin flag cleared.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Look up the id and password hash for a (normalised) username.
  fn find_credentials(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  // ── Actors ────────────────────────────────────────────────────────────

  /// Insert an actor. A natural-key collision inserts nothing and is
  /// reported as a conflict.
  fn add_actor(
    &self,
    input: NewActor,
  ) -> impl Future<Output = Result<Actor, Self::Error>> + Send + '_;

  /// Replace the non-empty fields of `patch` on actor `id`.
  fn update_actor(
    &self,
    id: ActorId,
    patch: ActorPatch,
  ) -> impl Future<Output = Result<Actor, Self::Error>> + Send + '_;

  /// Delete the actor and every link that references it.
  fn delete_actor(
    &self,
    id: ActorId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Movies ────────────────────────────────────────────────────────────

  /// Upsert each of `input.actors` by natural key, insert the movie, and
  /// link them, all-or-nothing.
  fn add_movie(
    &self,
    input: NewMovie,
  ) -> impl Future<Output = Result<Movie, Self::Error>> + Send + '_;

  fn update_movie(
    &self,
    id: MovieId,
    patch: MoviePatch,
  ) -> impl Future<Output = Result<Movie, Self::Error>> + Send + '_;

  /// Delete the movie and every link that references it.
  fn delete_movie(
    &self,
    id: MovieId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Links ─────────────────────────────────────────────────────────────

  /// Upsert `actor` by natural key and link it to `movie_id`. Returns the
  /// resolved actor id.
  fn link_actor_to_movie(
    &self,
    movie_id: MovieId,
    actor: NewActor,
  ) -> impl Future<Output = Result<ActorId, Self::Error>> + Send + '_;

  fn unlink_actor_from_movie(
    &self,
    actor_id: ActorId,
    movie_id: MovieId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Every movie with its actors, in the requested order.
  fn list_movies(
    &self,
    order: MovieOrder,
  ) -> impl Future<Output = Result<Vec<Movie>, Self::Error>> + Send + '_;

  /// Every actor with the movies they appear in, ordered by actor id.
  fn list_actors_with_movies(
    &self,
  ) -> impl Future<Output = Result<Vec<ActorWithMovies>, Self::Error>> + Send + '_;

  /// Actors matching any supplied criterion, ordered by id.
  fn search_actors(
    &self,
    criteria: ActorCriteria,
  ) -> impl Future<Output = Result<Vec<Actor>, Self::Error>> + Send + '_;

  /// Movies (without actors) matching any supplied criterion, ordered by id.
  fn search_movies(
    &self,
    criteria: MovieCriteria,
  ) -> impl Future<Output = Result<Vec<Movie>, Self::Error>> + Send + '_;

  /// Movies matching any supplied name / actor-name criterion, each with its
  /// full actor list.
  fn search_movies_with_actors(
    &self,
    criteria: MovieCriteria,
  ) -> impl Future<Output = Result<Vec<Movie>, Self::Error>> + Send + '_;
}
