//! [`SqliteStore`], the SQLite implementation of [`CatalogStore`].

use std::{path::Path, time::Duration};

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension as _, Transaction};
use tracing::debug;
use uuid::Uuid;

use filmoteka_core::{
  aggregate,
  catalog::{
    Actor, ActorCriteria, ActorId, ActorPatch, ActorWithMovies, Movie,
    MovieCriteria, MovieId, MoviePatch, NewActor, NewMovie,
  },
  order::MovieOrder,
  person::{Credentials, NewPerson, Person, PersonId},
  store::{CatalogStore, PrivilegeOracle},
  validate,
};

use crate::{
  Error, Result,
  deadline::{self, Deadline},
  encode::{
    RawActor, RawActorMovie, RawMovie, RawMovieActor, RawPerson, decode_uuid,
    encode_date, encode_dt, encode_uuid,
  },
  error::Constraint,
  query::{self, Predicates},
  schema::SCHEMA,
};

/// Used by [`SqliteStore::open_in_memory`] and when no timeout is configured.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Filmoteka catalog backed by a single SQLite file.
///
/// Cloning is cheap; clones share the inner connection. Operations on one
/// connection run one at a time, in request order.
#[derive(Clone)]
pub struct SqliteStore {
  conn:          tokio_rusqlite::Connection,
  query_timeout: Duration,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, query_timeout: Duration) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, query_timeout };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store with the default query timeout.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, query_timeout: DEFAULT_QUERY_TIMEOUT };
    store.init_schema().await?;
    Ok(store)
  }

  pub fn with_query_timeout(mut self, query_timeout: Duration) -> Self {
    self.query_timeout = query_timeout;
    self
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` in a transaction on the database thread, bounded by the query
  /// timeout.
  pub(crate) async fn write<T, F>(&self, op: &'static str, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    let deadline = Deadline::after(self.query_timeout);
    self
      .conn
      .call(move |conn| Ok(deadline::write(conn, deadline, op, f)))
      .await?
  }

  /// Like [`write`](Self::write) without the transaction.
  pub(crate) async fn read<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T> + Send + 'static,
  {
    let deadline = Deadline::after(self.query_timeout);
    self
      .conn
      .call(move |conn| Ok(deadline::read(conn, deadline, f)))
      .await?
  }

  /// Set or clear a person's admin flag. This is the only way the flag ever
  /// changes.
  pub async fn set_admin(&self, username: &str, is_admin: bool) -> Result<Person> {
    let username = validate::normalize_username(username);
    let raw = self
      .write("set_admin", move |tx| {
        let raw = tx.query_row(
          "UPDATE person SET is_admin = ?1 WHERE username = ?2
           RETURNING person_id, username, first_name, last_name, sex,
                     birth_date, is_admin, created_at",
          rusqlite::params![is_admin, username],
          |row| {
            Ok(RawPerson {
              person_id:  row.get(0)?,
              username:   row.get(1)?,
              first_name: row.get(2)?,
              last_name:  row.get(3)?,
              sex:        row.get(4)?,
              birth_date: row.get(5)?,
              is_admin:   row.get(6)?,
              created_at: row.get(7)?,
            })
          },
        )
        .optional()?;
        raw.ok_or(Error::UsernameNotFound(username))
      })
      .await?;
    raw.into_person()
  }
}

fn today() -> NaiveDate { Utc::now().date_naive() }

// ─── Statement helpers ───────────────────────────────────────────────────────
//
// These run on the database thread inside a transaction opened by `write`.

const ACTOR_RETURNING: &str = "RETURNING actor_id, first_name, last_name, sex, birth_date";
const MOVIE_RETURNING: &str =
  "RETURNING movie_id, name, description, release_date, rating";

/// Insert `actor`, or find the existing row with the same natural key.
/// An existing row keeps its stored `sex`.
fn upsert_actor(tx: &Connection, actor: &NewActor) -> Result<Actor> {
  let raw = tx.query_row(
    &format!(
      "INSERT INTO actor (first_name, last_name, sex, birth_date)
       VALUES (?1, ?2, ?3, ?4)
       ON CONFLICT (first_name, last_name, birth_date)
       DO UPDATE SET first_name = excluded.first_name
       {ACTOR_RETURNING}"
    ),
    rusqlite::params![
      actor.first_name,
      actor.last_name,
      actor.sex,
      encode_date(actor.birth_date),
    ],
    |row| RawActor::from_row(row, 0),
  )?;
  raw.into_actor()
}

fn insert_link(tx: &Connection, actor_id: ActorId, movie_id: MovieId) -> Result<()> {
  tx.execute(
    "INSERT INTO actor_movie (actor_id, movie_id) VALUES (?1, ?2)",
    rusqlite::params![actor_id, movie_id],
  )
  .map_err(|e| {
    Error::from(e)
      .on_constraint(Constraint::Unique, Error::LinkExists { actor_id, movie_id })
      .on_constraint(Constraint::ForeignKey, Error::MovieNotFound(movie_id))
  })?;
  Ok(())
}

fn collect_rows<T>(
  conn: &Connection,
  sql: &str,
  params: Vec<rusqlite::types::Value>,
  map: impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(rusqlite::params_from_iter(params), map)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn nest_movies(raws: Vec<RawMovieActor>) -> Result<Vec<Movie>> {
  let rows = raws
    .into_iter()
    .map(RawMovieActor::into_row)
    .collect::<Result<Vec<_>>>()?;
  Ok(aggregate::movies_with_actors(rows).collect())
}

// ─── PrivilegeOracle impl ────────────────────────────────────────────────────

impl PrivilegeOracle for SqliteStore {
  type Error = Error;

  async fn person_exists(&self, id: PersonId) -> Result<bool> {
    let id_str = encode_uuid(id);
    self
      .read(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (SELECT 1 FROM person WHERE person_id = ?1)",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await
  }

  async fn is_admin(&self, id: PersonId) -> Result<bool> {
    let id_str = encode_uuid(id);
    self
      .read(move |conn| {
        conn
          .query_row(
            "SELECT is_admin FROM person WHERE person_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?
          .ok_or(Error::PersonNotFound(id))
      })
      .await
  }
}

// ─── CatalogStore impl ───────────────────────────────────────────────────────

impl CatalogStore for SqliteStore {
  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn add_person(&self, input: NewPerson) -> Result<Person> {
    validate::new_person(&input, today())?;

    let person = Person {
      id:         Uuid::new_v4(),
      username:   input.username,
      first_name: input.first_name,
      last_name:  input.last_name,
      sex:        input.sex,
      birth_date: input.birth_date,
      is_admin:   false,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(person.id);
    let username   = person.username.clone();
    let hash       = input.password_hash;
    let first_name = person.first_name.clone();
    let last_name  = person.last_name.clone();
    let sex        = person.sex.clone();
    let birth_date = person.birth_date.map(encode_date);
    let at_str     = encode_dt(person.created_at);

    self
      .write("add_person", move |tx| {
        tx.execute(
          "INSERT INTO person (
             person_id, username, password_hash, first_name, last_name,
             sex, birth_date, is_admin, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
          rusqlite::params![
            id_str, username, hash, first_name, last_name, sex, birth_date, at_str,
          ],
        )
        .map_err(|e| Error::from(e).on_constraint(Constraint::Unique, Error::UsernameTaken))?;
        Ok(())
      })
      .await?;

    Ok(person)
  }

  async fn find_credentials(&self, username: String) -> Result<Option<Credentials>> {
    let row: Option<(String, String)> = self
      .read(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT person_id, password_hash FROM person WHERE username = ?1",
              rusqlite::params![username],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    row
      .map(|(id, password_hash)| {
        Ok(Credentials { person_id: decode_uuid(&id)?, password_hash })
      })
      .transpose()
  }

  // ── Actors ────────────────────────────────────────────────────────────────

  async fn add_actor(&self, input: NewActor) -> Result<Actor> {
    validate::new_actor(&input, today())?;

    self
      .write("add_actor", move |tx| {
        let inserted = tx.execute(
          "INSERT INTO actor (first_name, last_name, sex, birth_date)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (first_name, last_name, birth_date) DO NOTHING",
          rusqlite::params![
            input.first_name,
            input.last_name,
            input.sex,
            encode_date(input.birth_date),
          ],
        )?;
        if inserted == 0 {
          return Err(Error::ActorExists);
        }
        Ok(Actor {
          id:         tx.last_insert_rowid(),
          first_name: input.first_name,
          last_name:  input.last_name,
          sex:        input.sex,
          birth_date: input.birth_date,
        })
      })
      .await
  }

  async fn update_actor(&self, id: ActorId, patch: ActorPatch) -> Result<Actor> {
    validate::id(id, "Actor")?;
    validate::actor_patch(&patch, today())?;

    let birth_date = patch.birth_date().map(encode_date);
    let raw = self
      .write("update_actor", move |tx| {
        tx.query_row(
          &format!(
            "UPDATE actor SET
               first_name = COALESCE(NULLIF(?1, ''), first_name),
               last_name  = COALESCE(NULLIF(?2, ''), last_name),
               sex        = COALESCE(NULLIF(?3, ''), sex),
               birth_date = COALESCE(?4, birth_date)
             WHERE actor_id = ?5
             {ACTOR_RETURNING}"
          ),
          rusqlite::params![patch.first_name, patch.last_name, patch.sex, birth_date, id],
          |row| RawActor::from_row(row, 0),
        )
        .optional()
        .map_err(|e| Error::from(e).on_constraint(Constraint::Unique, Error::ActorExists))?
        .ok_or(Error::ActorNotFound(id))
      })
      .await?;
    raw.into_actor()
  }

  async fn delete_actor(&self, id: ActorId) -> Result<()> {
    validate::id(id, "Actor")?;

    self
      .write("delete_actor", move |tx| {
        let links = tx.execute(
          "DELETE FROM actor_movie WHERE actor_id = ?1",
          rusqlite::params![id],
        )?;
        let deleted =
          tx.execute("DELETE FROM actor WHERE actor_id = ?1", rusqlite::params![id])?;
        if deleted == 0 {
          return Err(Error::ActorNotDeleted(id));
        }
        debug!(actor_id = id, links, "actor deleted");
        Ok(())
      })
      .await
  }

  // ── Movies ────────────────────────────────────────────────────────────────

  async fn add_movie(&self, input: NewMovie) -> Result<Movie> {
    validate::new_movie(&input, today())?;

    self
      .write("add_movie", move |tx| {
        let mut actors: Vec<Actor> = Vec::with_capacity(input.actors.len());
        for new_actor in &input.actors {
          let actor = upsert_actor(tx, new_actor)?;
          if !actors.iter().any(|a| a.id == actor.id) {
            actors.push(actor);
          }
        }

        tx.execute(
          "INSERT INTO movie (name, description, release_date, rating)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            input.name,
            input.description,
            encode_date(input.date),
            input.rating,
          ],
        )
        .map_err(|e| Error::from(e).on_constraint(Constraint::Unique, Error::MovieExists))?;
        let movie_id = tx.last_insert_rowid();

        for actor in &actors {
          insert_link(tx, actor.id, movie_id)?;
        }

        Ok(Movie {
          id: movie_id,
          name: input.name,
          description: input.description,
          date: input.date,
          rating: input.rating,
          actors,
        })
      })
      .await
  }

  async fn update_movie(&self, id: MovieId, patch: MoviePatch) -> Result<Movie> {
    validate::id(id, "Movie")?;
    validate::movie_patch(&patch)?;

    let date = patch.date().map(encode_date);
    let raw = self
      .write("update_movie", move |tx| {
        tx.query_row(
          &format!(
            "UPDATE movie SET
               name         = COALESCE(NULLIF(?1, ''), name),
               description  = COALESCE(NULLIF(?2, ''), description),
               release_date = COALESCE(?3, release_date),
               rating       = COALESCE(?4, rating)
             WHERE movie_id = ?5
             {MOVIE_RETURNING}"
          ),
          rusqlite::params![patch.name, patch.description, date, patch.rating, id],
          |row| RawMovie::from_row(row, 0),
        )
        .optional()
        .map_err(|e| Error::from(e).on_constraint(Constraint::Unique, Error::MovieExists))?
        .ok_or(Error::MovieNotFound(id))
      })
      .await?;
    raw.into_movie()
  }

  async fn delete_movie(&self, id: MovieId) -> Result<()> {
    validate::id(id, "Movie")?;

    self
      .write("delete_movie", move |tx| {
        let links = tx.execute(
          "DELETE FROM actor_movie WHERE movie_id = ?1",
          rusqlite::params![id],
        )?;
        let deleted =
          tx.execute("DELETE FROM movie WHERE movie_id = ?1", rusqlite::params![id])?;
        if deleted == 0 {
          return Err(Error::MovieNotDeleted(id));
        }
        debug!(movie_id = id, links, "movie deleted");
        Ok(())
      })
      .await
  }

  // ── Links ─────────────────────────────────────────────────────────────────

  async fn link_actor_to_movie(&self, movie_id: MovieId, actor: NewActor) -> Result<ActorId> {
    validate::id(movie_id, "Movie")?;
    validate::new_actor(&actor, today())?;

    self
      .write("link_actor_to_movie", move |tx| {
        let actor = upsert_actor(tx, &actor)?;
        insert_link(tx, actor.id, movie_id)?;
        Ok(actor.id)
      })
      .await
  }

  async fn unlink_actor_from_movie(&self, actor_id: ActorId, movie_id: MovieId) -> Result<()> {
    validate::id(actor_id, "Actor")?;
    validate::id(movie_id, "Movie")?;

    self
      .write("unlink_actor_from_movie", move |tx| {
        let deleted = tx.execute(
          "DELETE FROM actor_movie WHERE actor_id = ?1 AND movie_id = ?2",
          rusqlite::params![actor_id, movie_id],
        )?;
        if deleted == 0 {
          return Err(Error::LinkNotFound { actor_id, movie_id });
        }
        Ok(())
      })
      .await
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn list_movies(&self, order: MovieOrder) -> Result<Vec<Movie>> {
    let sql = query::movie_list(order);
    let raws = self
      .read(move |conn| collect_rows(conn, &sql, Vec::new(), RawMovieActor::from_row))
      .await?;
    nest_movies(raws)
  }

  async fn list_actors_with_movies(&self) -> Result<Vec<ActorWithMovies>> {
    let raws = self
      .read(|conn| {
        collect_rows(conn, &query::actor_list_with_movies(), Vec::new(), RawActorMovie::from_row)
      })
      .await?;
    let rows = raws
      .into_iter()
      .map(RawActorMovie::into_row)
      .collect::<Result<Vec<_>>>()?;
    Ok(aggregate::actors_with_movies(rows).collect())
  }

  async fn search_actors(&self, criteria: ActorCriteria) -> Result<Vec<Actor>> {
    let filter = query::actor_predicates(&criteria);
    if filter.is_empty() {
      return Ok(Vec::new());
    }
    let sql = query::actor_search(&filter);
    let params = filter.into_params();
    let raws = self
      .read(move |conn| collect_rows(conn, &sql, params, |row| RawActor::from_row(row, 0)))
      .await?;
    raws.into_iter().map(RawActor::into_actor).collect()
  }

  async fn search_movies(&self, criteria: MovieCriteria) -> Result<Vec<Movie>> {
    let filter = query::movie_predicates(&criteria);
    if filter.is_empty() {
      return Ok(Vec::new());
    }
    let sql = query::movie_search(&filter);
    let params = filter.into_params();
    let raws = self
      .read(move |conn| collect_rows(conn, &sql, params, |row| RawMovie::from_row(row, 0)))
      .await?;
    raws.into_iter().map(RawMovie::into_movie).collect()
  }

  async fn search_movies_with_actors(&self, criteria: MovieCriteria) -> Result<Vec<Movie>> {
    let filter: Predicates = query::title_or_cast_predicates(&criteria);
    if filter.is_empty() {
      return Ok(Vec::new());
    }
    let sql = query::movie_search_with_cast(&filter);
    let params = filter.into_params();
    let raws = self
      .read(move |conn| collect_rows(conn, &sql, params, RawMovieActor::from_row))
      .await?;
    nest_movies(raws)
  }
}
