use mms_dal::movie::{CreateMovie, MovieRepository, UpdateMovie};
use mms_dal::search::MovieSearchRequest;
use sqlx::Executor;

const TEST_DATA: &str = r#"
INSERT INTO genre (id, name) VALUES (1, 'detective');
INSERT INTO genre (id, name) VALUES (2, 'sci-fi');
INSERT INTO genre (id, name) VALUES (3, 'drama');

INSERT INTO movie (id, title, director, year, imdb)
VALUES (1, 'Sherlock Holmes', 'Lionel Wigram', 2009, '7.6');
INSERT INTO movie (id, title, director, year, imdb)
VALUES (2, 'Solaris', 'Andrei Tarkovsky', 1972, '8.0');
INSERT INTO movie (id, title, director, year, imdb)
VALUES (3, 'Stalker', 'Andrei Tarkovsky', 1979, '8.1');

INSERT INTO movie_genre (movie_id, genre_id) VALUES (1, 1);
INSERT INTO movie_genre (movie_id, genre_id) VALUES (2, 2);
INSERT INTO movie_genre (movie_id, genre_id) VALUES (2, 3);
INSERT INTO movie_genre (movie_id, genre_id) VALUES (3, 2);
"#;

async fn init_db() -> sqlx::Pool<sqlx::Sqlite> {
    const DB_URL: &str = "sqlite::memory:";
    let conn = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .connect(DB_URL)
        .await
        .unwrap();
    conn.execute("PRAGMA foreign_keys = ON").await.unwrap();
    sqlx::migrate!("../../migrations").run(&conn).await.unwrap();

    sqlx::raw_sql(TEST_DATA).execute(&conn).await.unwrap();

    conn
}

fn new_movie(title: &str, genres: &str) -> CreateMovie {
    CreateMovie {
        title: title.to_string(),
        director: "Guy Ritchie".to_string(),
        year: 2009,
        genres: genres.to_string(),
        imdb: "7.6".to_string(),
    }
}

#[tokio::test]
async fn test_movie_get() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let movie = repo.get(2).await.unwrap();
    assert_eq!(movie.title, "Solaris");
    assert_eq!(movie.genre, "sci-fi,drama");

    // repeated reads return an identical representation
    let again = repo.get(2).await.unwrap();
    assert_eq!(movie, again);

    let missing = repo.get(100).await;
    assert!(matches!(
        missing,
        Err(mms_dal::Error::RecordNotFound(entity)) if entity == "Movie"
    ));
}

#[tokio::test]
async fn test_movie_list_all() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].genre, "detective");
}

#[tokio::test]
async fn test_movie_list_by_genre() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let sci_fi = repo.list_by_genre("sci-fi").await.unwrap();
    assert_eq!(sci_fi.len(), 2);
    // genre list stays complete even when filtered by one genre
    assert_eq!(sci_fi[0].genre, "sci-fi,drama");

    // lookup is a pass-through on the stored name, no lowercasing
    let upper = repo.list_by_genre("Sci-Fi").await.unwrap();
    assert!(upper.is_empty());
}

#[tokio::test]
async fn test_movie_create() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let created = repo
        .create(new_movie("RocknRolla", " Drama , DETECTIVE "))
        .await
        .unwrap();
    assert_eq!(created.title, "RocknRolla");
    let mut genres: Vec<&str> = created.genre.split(',').collect();
    genres.sort();
    assert_eq!(genres, vec!["detective", "drama"]);
}

#[tokio::test]
async fn test_movie_create_unknown_genre_is_atomic() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let result = repo.create(new_movie("RocknRolla", "drama,western")).await;
    assert!(matches!(
        result,
        Err(mms_dal::Error::RecordNotFound(entity)) if entity == "Genre"
    ));

    // nothing was persisted
    assert_eq!(repo.list_all().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_movie_update_partial() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let before = repo.get(1).await.unwrap();
    let updated = repo
        .update(
            1,
            UpdateMovie {
                title: Some("Sherlock Holmes: A Game of Shadows".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Sherlock Holmes: A Game of Shadows");
    assert_eq!(updated.director, before.director);
    assert_eq!(updated.year, before.year);
    assert_eq!(updated.imdb, before.imdb);
    assert_eq!(updated.genre, before.genre);
}

#[tokio::test]
async fn test_movie_update_replaces_genres() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let updated = repo
        .update(
            2,
            UpdateMovie {
                genres: Some("detective".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.genre, "detective");
    assert_eq!(updated.title, "Solaris");
}

#[tokio::test]
async fn test_movie_update_unknown_genre_rolls_back() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let result = repo
        .update(
            2,
            UpdateMovie {
                title: Some("Solyaris".to_string()),
                genres: Some("western".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(mms_dal::Error::RecordNotFound(_))));

    // the partial field update rolled back with the genre failure
    let movie = repo.get(2).await.unwrap();
    assert_eq!(movie.title, "Solaris");
    assert_eq!(movie.genre, "sci-fi,drama");
}

#[tokio::test]
async fn test_movie_update_missing() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let result = repo.update(100, UpdateMovie::default()).await;
    assert!(matches!(
        result,
        Err(mms_dal::Error::RecordNotFound(entity)) if entity == "Movie"
    ));
}

#[tokio::test]
async fn test_movie_delete_returns_representation() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let deleted = repo.delete(2).await.unwrap();
    assert_eq!(deleted.title, "Solaris");
    assert_eq!(deleted.genre, "sci-fi,drama");

    assert!(matches!(
        repo.get(2).await,
        Err(mms_dal::Error::RecordNotFound(_))
    ));
    // associations are gone, so the genre can be deleted now if unused
    let remaining = repo.list_by_genre("drama").await.unwrap();
    assert!(remaining.is_empty());

    let missing = repo.delete(100).await;
    assert!(matches!(missing, Err(mms_dal::Error::RecordNotFound(_))));
}

#[tokio::test]
async fn test_search_empty_request_lists_all() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let all = repo.search(&MovieSearchRequest::default()).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_search_year_bounds() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let from_1979 = repo
        .search(&MovieSearchRequest {
            beginyear: 1979,
            ..Default::default()
        })
        .await
        .unwrap();
    let titles: Vec<&str> = from_1979.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Sherlock Holmes", "Stalker"]);

    let until_1979 = repo
        .search(&MovieSearchRequest {
            endyear: 1979,
            ..Default::default()
        })
        .await
        .unwrap();
    let titles: Vec<&str> = until_1979.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Solaris", "Stalker"]);

    // both bounds inclusive, matching exactly the range
    let seventies = repo
        .search(&MovieSearchRequest {
            beginyear: 1972,
            endyear: 1979,
            ..Default::default()
        })
        .await
        .unwrap();
    let titles: Vec<&str> = seventies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Solaris", "Stalker"]);
}

#[tokio::test]
async fn test_search_string_fields() {
    let conn = init_db().await;
    let repo = MovieRepository::new(conn);

    let by_director = repo
        .search(&MovieSearchRequest {
            director: Some("Andrei Tarkovsky".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_director.len(), 2);

    let by_title = repo
        .search(&MovieSearchRequest {
            title: Some("Stalker".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].genre, "sci-fi");

    let combined = repo
        .search(&MovieSearchRequest {
            director: Some("Andrei Tarkovsky".to_string()),
            beginyear: 1975,
            endyear: 1985,
            imdb: Some("8.1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].title, "Stalker");
}
