//! SQL schema for the Filmoteka SQLite store.
//!
//! Executed once at connection startup. Dates are `YYYY-MM-DD` text so that
//! lexical and chronological order agree.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS person (
    person_id     TEXT PRIMARY KEY,      -- hyphenated UUID, the session subject
    username      TEXT NOT NULL UNIQUE,  -- stored lower-cased
    password_hash TEXT NOT NULL,         -- argon2 PHC string
    first_name    TEXT NOT NULL DEFAULT '',
    last_name     TEXT NOT NULL DEFAULT '',
    sex           TEXT NOT NULL DEFAULT '',
    birth_date    TEXT,
    is_admin      INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS actor (
    actor_id   INTEGER PRIMARY KEY,
    first_name TEXT NOT NULL,
    last_name  TEXT NOT NULL,
    sex        TEXT NOT NULL,
    birth_date TEXT NOT NULL,
    UNIQUE (first_name, last_name, birth_date)
);

CREATE TABLE IF NOT EXISTS movie (
    movie_id     INTEGER PRIMARY KEY,
    name         TEXT NOT NULL,
    description  TEXT NOT NULL,
    release_date TEXT NOT NULL,
    rating       INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 10),
    UNIQUE (name, release_date)
);

-- No ON DELETE CASCADE: deletes remove links explicitly first.
CREATE TABLE IF NOT EXISTS actor_movie (
    actor_id INTEGER NOT NULL REFERENCES actor(actor_id),
    movie_id INTEGER NOT NULL REFERENCES movie(movie_id),
    PRIMARY KEY (actor_id, movie_id)
);

CREATE INDEX IF NOT EXISTS actor_movie_movie_idx ON actor_movie(movie_id);
CREATE INDEX IF NOT EXISTS movie_rating_idx      ON movie(rating);
CREATE INDEX IF NOT EXISTS movie_date_idx        ON movie(release_date);

PRAGMA user_version = 1;
";
