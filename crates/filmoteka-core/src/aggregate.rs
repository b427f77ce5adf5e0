//! Folding flat join rows into nested objects.
//!
//! A join of movies with their actors produces one row per (movie, actor)
//! pair. [`nest`] turns that back into one item per movie holding its actors,
//! by grouping *adjacent* rows that share a key.
//!
//! Grouping only looks at neighbours, so the input must already be ordered
//! such that all rows of one parent are contiguous. The store's queries
//! guarantee this by ending every ORDER BY with the grouping key. If a query's
//! ordering changes, that tie-break must be kept (or the rows re-sorted by the
//! key) or a parent will be split into several items.

use chrono::NaiveDate;

use crate::catalog::{Actor, ActorWithMovies, Movie};

/// One row of a parent/child join. The child is `None` for a parent with no
/// children (a LEFT JOIN miss).
pub trait JoinRow {
  type Key: PartialEq;
  type Parent;
  type Child;

  fn key(&self) -> Self::Key;
  fn into_parts(self) -> (Self::Parent, Option<Self::Child>);
}

/// Lazy, single-pass iterator produced by [`nest`].
pub struct Nested<I>
where
  I: Iterator,
  I::Item: JoinRow,
{
  rows:    I,
  current: Option<Group<I::Item>>,
}

struct Group<R: JoinRow> {
  key:      R::Key,
  parent:   R::Parent,
  children: Vec<R::Child>,
}

impl<R: JoinRow> Group<R> {
  fn start(key: R::Key, row: R) -> Self {
    let (parent, child) = row.into_parts();
    Self { key, parent, children: child.into_iter().collect() }
  }

  fn finish(self) -> (R::Parent, Vec<R::Child>) { (self.parent, self.children) }
}

/// Group adjacent rows with equal keys into `(parent, children)` pairs.
pub fn nest<I>(rows: I) -> Nested<I::IntoIter>
where
  I: IntoIterator,
  I::Item: JoinRow,
{
  Nested { rows: rows.into_iter(), current: None }
}

impl<I> Iterator for Nested<I>
where
  I: Iterator,
  I::Item: JoinRow,
{
  type Item = (<I::Item as JoinRow>::Parent, Vec<<I::Item as JoinRow>::Child>);

  fn next(&mut self) -> Option<Self::Item> {
    for row in self.rows.by_ref() {
      let key = row.key();
      if let Some(group) = self.current.as_mut()
        && group.key == key
      {
        if let (_, Some(child)) = row.into_parts() {
          group.children.push(child);
        }
        continue;
      }
      if let Some(done) = self.current.replace(Group::start(key, row)) {
        return Some(done.finish());
      }
    }
    self.current.take().map(Group::finish)
  }
}

// ─── Concrete row shapes ─────────────────────────────────────────────────────

/// A movie joined with at most one of its actors.
#[derive(Debug, Clone)]
pub struct MovieActorRow {
  pub movie: Movie,
  pub actor: Option<Actor>,
}

impl JoinRow for MovieActorRow {
  type Key = (String, NaiveDate);
  type Parent = Movie;
  type Child = Actor;

  fn key(&self) -> Self::Key { (self.movie.name.clone(), self.movie.date) }

  fn into_parts(self) -> (Movie, Option<Actor>) { (self.movie, self.actor) }
}

/// An actor joined with at most one of their movies.
#[derive(Debug, Clone)]
pub struct ActorMovieRow {
  pub actor: Actor,
  pub movie: Option<Movie>,
}

impl JoinRow for ActorMovieRow {
  type Key = i64;
  type Parent = Actor;
  type Child = Movie;

  fn key(&self) -> i64 { self.actor.id }

  fn into_parts(self) -> (Actor, Option<Movie>) { (self.actor, self.movie) }
}

/// Nest actors under movies. Rows must be ordered so that each movie's rows
/// (same name and date) are adjacent.
pub fn movies_with_actors<I>(rows: I) -> impl Iterator<Item = Movie>
where
  I: IntoIterator<Item = MovieActorRow>,
{
  nest(rows).map(|(mut movie, actors)| {
    movie.actors = actors;
    movie
  })
}

/// Nest movies under actors. Rows must be ordered by actor id.
pub fn actors_with_movies<I>(rows: I) -> impl Iterator<Item = ActorWithMovies>
where
  I: IntoIterator<Item = ActorMovieRow>,
{
  nest(rows).map(|(actor, movies)| ActorWithMovies { actor, movies })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32) -> NaiveDate { NaiveDate::from_ymd_opt(y, 1, 1).unwrap() }

  fn movie(id: i64, name: &str, year: i32) -> Movie {
    Movie {
      id,
      name: name.into(),
      description: String::new(),
      date: date(year),
      rating: 5,
      actors: vec![],
    }
  }

  fn actor(id: i64, first: &str) -> Actor {
    Actor {
      id,
      first_name: first.into(),
      last_name: "X".into(),
      sex: String::new(),
      birth_date: date(1960),
    }
  }

  fn row(m: &Movie, a: Option<Actor>) -> MovieActorRow {
    MovieActorRow { movie: m.clone(), actor: a }
  }

  #[test]
  fn adjacent_rows_fold_into_one_movie() {
    let solaris = movie(1, "Solaris", 1972);
    let stalker = movie(2, "Stalker", 1979);
    let rows = vec![
      row(&solaris, Some(actor(1, "Natalya"))),
      row(&solaris, Some(actor(2, "Donatas"))),
      row(&stalker, Some(actor(3, "Alexander"))),
    ];

    let movies: Vec<Movie> = movies_with_actors(rows).collect();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].name, "Solaris");
    assert_eq!(movies[0].actors.len(), 2);
    assert_eq!(movies[1].name, "Stalker");
    assert_eq!(movies[1].actors[0].first_name, "Alexander");
  }

  #[test]
  fn same_name_different_date_is_a_different_movie() {
    let original = movie(1, "Solaris", 1972);
    let remake = movie(2, "Solaris", 2002);
    let rows = vec![
      row(&original, Some(actor(1, "Natalya"))),
      row(&remake, Some(actor(2, "George"))),
    ];
    assert_eq!(movies_with_actors(rows).count(), 2);
  }

  #[test]
  fn movie_without_actors_has_empty_list() {
    let mirror = movie(1, "Mirror", 1975);
    let movies: Vec<Movie> = movies_with_actors(vec![row(&mirror, None)]).collect();
    assert_eq!(movies.len(), 1);
    assert!(movies[0].actors.is_empty());
  }

  #[test]
  fn empty_input_yields_nothing() {
    assert_eq!(movies_with_actors(Vec::new()).count(), 0);
  }

  #[test]
  fn non_adjacent_rows_are_not_merged() {
    // Grouping is adjacency-based; unsorted input splits a parent.
    let a = movie(1, "A", 2000);
    let b = movie(2, "B", 2000);
    let rows = vec![
      row(&a, Some(actor(1, "One"))),
      row(&b, Some(actor(2, "Two"))),
      row(&a, Some(actor(3, "Three"))),
    ];
    assert_eq!(movies_with_actors(rows).count(), 3);
  }

  #[test]
  fn nesting_is_lazy() {
    let a = movie(1, "A", 2000);
    let b = movie(2, "B", 2000);
    let mut pulled = 0;
    let rows = [row(&a, None), row(&b, None), row(&b, None)]
      .into_iter()
      .inspect(|_| pulled += 1);

    let mut nested = movies_with_actors(rows);
    let first = nested.next().unwrap();
    assert_eq!(first.name, "A");
    drop(nested);
    // Finding the end of "A" needs exactly one look-ahead row.
    assert_eq!(pulled, 2);
  }

  #[test]
  fn actors_group_their_movies() {
    let tarkovsky = actor(1, "Andrei");
    let rows = vec![
      ActorMovieRow { actor: tarkovsky.clone(), movie: Some(movie(1, "Mirror", 1975)) },
      ActorMovieRow { actor: tarkovsky, movie: Some(movie(2, "Stalker", 1979)) },
      ActorMovieRow { actor: actor(2, "Oleg"), movie: None },
    ];
    let actors: Vec<ActorWithMovies> = actors_with_movies(rows).collect();
    assert_eq!(actors.len(), 2);
    assert_eq!(actors[0].movies.len(), 2);
    assert!(actors[1].movies.is_empty());
  }
}
