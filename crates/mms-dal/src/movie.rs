use garde::Validate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, error::Result, genre, search::MovieSearchRequest};

/// Base select flattening the associated genre names into one comma
/// joined string, as used by the wire representation.
pub(crate) const MOVIE_SELECT: &str = "SELECT m.id, m.title, m.director, m.year, \
    COALESCE(GROUP_CONCAT(g.name), '') AS genre, m.imdb \
    FROM movie m \
    LEFT JOIN movie_genre mg ON mg.movie_id = m.id \
    LEFT JOIN genre g ON g.id = mg.genre_id";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i32,
    pub genre: String,
    pub imdb: String,
}

fn released_year(value: &i32, _ctx: &()) -> garde::Result {
    if *value < 1800 {
        return Err(garde::Error::new("year must be 1800 or later"));
    }
    let current = time::OffsetDateTime::now_utc().year();
    if *value > current {
        return Err(garde::Error::new("year must not be in the future"));
    }
    Ok(())
}

fn max_rating(value: &str, _ctx: &()) -> garde::Result {
    let rating: f64 = value
        .parse()
        .map_err(|_| garde::Error::new("rating must be a decimal number"))?;
    if rating > 10.0 {
        return Err(garde::Error::new("rating must be at most 10.0"));
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct CreateMovie {
    #[garde(length(min = 3, max = 50))]
    pub title: String,
    #[garde(length(min = 3, max = 50))]
    pub director: String,
    #[garde(custom(released_year))]
    pub year: i32,
    /// Comma separated names of existing genres.
    #[garde(length(min = 1))]
    pub genres: String,
    #[garde(pattern(r"^(?:[1-9]\d?|10)\.\d$"), custom(max_rating))]
    pub imdb: String,
}

/// Partial update. Fields left out of the payload keep their stored
/// value; a supplied genre string replaces the whole association set.
#[derive(Debug, Serialize, Deserialize, Clone, Default, Validate)]
pub struct UpdateMovie {
    #[garde(inner(length(min = 3, max = 50)))]
    pub title: Option<String>,
    #[garde(inner(length(min = 3, max = 50)))]
    pub director: Option<String>,
    #[garde(inner(custom(released_year)))]
    pub year: Option<i32>,
    #[garde(skip)]
    pub genres: Option<String>,
    #[garde(inner(pattern(r"^(?:[1-9]\d?|10)\.\d$"), custom(max_rating)))]
    pub imdb: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct MovieRow {
    title: String,
    director: String,
    year: i32,
    imdb: String,
}

fn not_found() -> Error {
    Error::RecordNotFound("Movie".to_string())
}

async fn link_genres(
    conn: &mut sqlx::SqliteConnection,
    movie_id: i64,
    genres: &[genre::Genre],
) -> Result<()> {
    for genre in genres {
        sqlx::query("INSERT OR IGNORE INTO movie_genre (movie_id, genre_id) VALUES (?, ?)")
            .bind(movie_id)
            .bind(genre.id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub type MovieRepository = MovieRepositoryImpl<crate::Pool>;

pub struct MovieRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> MovieRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn get(&self, id: i64) -> Result<Movie> {
        let sql = format!("{MOVIE_SELECT} WHERE m.id = ? GROUP BY m.id");
        sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn list_all(&self) -> Result<Vec<Movie>> {
        let sql = format!("{MOVIE_SELECT} GROUP BY m.id ORDER BY m.id");
        let movies = sqlx::query_as::<_, Movie>(&sql)
            .fetch_all(&self.executor)
            .await?;
        Ok(movies)
    }

    /// Lists movies associated with the genre of exactly this stored
    /// name. No normalization is applied to the argument.
    pub async fn list_by_genre(&self, genre_name: &str) -> Result<Vec<Movie>> {
        let sql = format!(
            "{MOVIE_SELECT} WHERE EXISTS (SELECT 1 FROM movie_genre fmg \
             JOIN genre fg ON fg.id = fmg.genre_id \
             WHERE fmg.movie_id = m.id AND fg.name = ?) \
             GROUP BY m.id ORDER BY m.id"
        );
        let movies = sqlx::query_as::<_, Movie>(&sql)
            .bind(genre_name)
            .fetch_all(&self.executor)
            .await?;
        Ok(movies)
    }

    pub async fn search(&self, request: &MovieSearchRequest) -> Result<Vec<Movie>> {
        let mut query = crate::search::filter_query(request);
        let movies = query
            .build_query_as::<Movie>()
            .fetch_all(&self.executor)
            .await?;
        Ok(movies)
    }
}

impl MovieRepositoryImpl<crate::Pool> {
    pub async fn create(&self, payload: CreateMovie) -> Result<Movie> {
        let mut tx = self.executor.begin().await?;
        let genres = genre::resolve_names(&mut tx, &payload.genres).await?;

        let result =
            sqlx::query("INSERT INTO movie (title, director, year, imdb) VALUES (?, ?, ?, ?)")
                .bind(&payload.title)
                .bind(&payload.director)
                .bind(payload.year)
                .bind(&payload.imdb)
                .execute(&mut *tx)
                .await?;
        let id = result.last_insert_rowid();
        link_genres(&mut tx, id, &genres).await?;
        tx.commit().await?;

        debug!("Created movie {id}");
        self.get(id).await
    }

    pub async fn update(&self, id: i64, payload: UpdateMovie) -> Result<Movie> {
        let mut tx = self.executor.begin().await?;
        let current = sqlx::query_as::<_, MovieRow>(
            "SELECT title, director, year, imdb FROM movie WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(not_found)?;

        let title = payload.title.unwrap_or(current.title);
        let director = payload.director.unwrap_or(current.director);
        let year = payload.year.unwrap_or(current.year);
        let imdb = payload.imdb.unwrap_or(current.imdb);
        sqlx::query("UPDATE movie SET title = ?, director = ?, year = ?, imdb = ? WHERE id = ?")
            .bind(&title)
            .bind(&director)
            .bind(year)
            .bind(&imdb)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if let Some(raw_names) = payload.genres {
            let genres = genre::resolve_names(&mut tx, &raw_names).await?;
            sqlx::query("DELETE FROM movie_genre WHERE movie_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_genres(&mut tx, id, &genres).await?;
        }
        tx.commit().await?;

        debug!("Updated movie {id}");
        self.get(id).await
    }

    /// Deletes the movie and returns its representation as it was just
    /// before removal, including the flattened genre names.
    pub async fn delete(&self, id: i64) -> Result<Movie> {
        let mut tx = self.executor.begin().await?;
        let sql = format!("{MOVIE_SELECT} WHERE m.id = ? GROUP BY m.id");
        let movie = sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(not_found)?;

        sqlx::query("DELETE FROM movie_genre WHERE movie_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM movie WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Deleted movie {id}");
        Ok(movie)
    }
}
