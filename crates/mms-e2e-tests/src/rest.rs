use anyhow::Result;
use mms_dal::{genre::Genre, movie::Movie};
use reqwest::Url;
use serde_json::json;
use tracing::info;

pub async fn create_genre(client: &reqwest::Client, base_url: &Url, name: &str) -> Result<Genre> {
    let api_url = base_url.join("genre")?;

    let response = client
        .post(api_url.clone())
        .body(name.to_string())
        .send()
        .await?;
    info!("Genre response: {:#?}", response);
    assert!(response.status().is_success());
    assert!(response.status().as_u16() == 201);
    assert!(response.headers().contains_key("location"));

    let new_genre: Genre = response.json().await?;
    Ok(new_genre)
}

pub async fn create_movie(
    client: &reqwest::Client,
    base_url: &Url,
    title: &str,
    director: &str,
    year: i32,
    genres: &str,
    imdb: &str,
) -> Result<Movie> {
    let payload = json!({
        "title": title,
        "director": director,
        "year": year,
        "genres": genres,
        "imdb": imdb,
    });
    let api_url = base_url.join("movie")?;

    let response = client.post(api_url.clone()).json(&payload).send().await?;
    info!("Movie response: {:#?}", response);
    assert!(response.status().is_success());
    assert!(response.status().as_u16() == 201);
    assert!(response.headers().contains_key("location"));

    let new_movie: Movie = response.json().await?;
    Ok(new_movie)
}
