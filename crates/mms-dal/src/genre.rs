use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, error::Result};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

fn not_found() -> Error {
    Error::RecordNotFound("Genre".to_string())
}

fn name_conflict(err: sqlx::Error) -> Error {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            Error::RecordAlreadyExists("Genre".to_string())
        }
        other => other.into(),
    }
}

/// Resolves a comma separated list of genre names to stored records.
///
/// Tokens are trimmed and lowercased before lookup, which matches the
/// normalization applied when genres are created. The first token
/// without a matching record fails the whole resolution. Genres are
/// never created here.
pub async fn resolve_names(
    conn: &mut sqlx::SqliteConnection,
    raw_names: &str,
) -> Result<Vec<Genre>> {
    let mut genres = Vec::new();
    for token in raw_names.split(',') {
        let name = token.trim().to_lowercase();
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE name = ?")
            .bind(&name)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(not_found)?;
        genres.push(genre);
    }
    Ok(genres)
}

pub type GenreRepository = GenreRepositoryImpl<crate::Pool>;

pub struct GenreRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> GenreRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    pub async fn get(&self, id: i64) -> Result<Genre> {
        sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.executor)
            .await?
            .ok_or_else(not_found)
    }

    pub async fn list_all(&self) -> Result<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre ORDER BY id")
            .fetch_all(&self.executor)
            .await?;
        Ok(genres)
    }

    /// Stores the name lowercased. Duplicate names are rejected by the
    /// unique constraint on the name column.
    pub async fn create(&self, name: &str) -> Result<Genre> {
        let name = name.to_lowercase();
        let result = sqlx::query("INSERT INTO genre (name) VALUES (?)")
            .bind(&name)
            .execute(&self.executor)
            .await
            .map_err(name_conflict)?;

        let id = result.last_insert_rowid();
        debug!("Created genre {id}");
        self.get(id).await
    }

    /// Overwrites the name as sent, without the lowercasing done on
    /// create. Kept for compatibility with existing clients.
    pub async fn update(&self, id: i64, name: &str) -> Result<Genre> {
        let existing = self.get(id).await?;
        sqlx::query("UPDATE genre SET name = ? WHERE id = ?")
            .bind(name)
            .bind(existing.id)
            .execute(&self.executor)
            .await
            .map_err(name_conflict)?;
        self.get(id).await
    }
}

impl GenreRepositoryImpl<crate::Pool> {
    /// Deletes the genre and returns its last stored state. Fails while
    /// any movie still references the genre.
    pub async fn delete(&self, id: i64) -> Result<Genre> {
        let mut tx = self.executor.begin().await?;
        let genre = sqlx::query_as::<_, Genre>("SELECT id, name FROM genre WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(not_found)?;

        let movies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM movie_genre WHERE genre_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if movies > 0 {
            return Err(Error::RecordNotDeletable(
                "Cannot delete this genre because there are movies associated with it".to_string(),
            ));
        }

        sqlx::query("DELETE FROM genre WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        debug!("Deleted genre {id}");
        Ok(genre)
    }
}
