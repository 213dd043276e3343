use axum::{
    Json,
    extract::{Path, Query},
    response::IntoResponse,
};
use http::{StatusCode, header};
use mms_dal::{
    movie::{CreateMovie, MovieRepository, UpdateMovie},
    search::MovieSearchRequest,
};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::validate::Garde;

crate::repository_from_request!(MovieRepository);

#[derive(Debug, Deserialize)]
pub struct GenreQuery {
    pub genre: String,
}

pub async fn list_all(repository: MovieRepository) -> ApiResult<impl IntoResponse> {
    let movies = repository.list_all().await?;
    Ok((StatusCode::OK, Json(movies)))
}

pub async fn list_by_genre(
    Query(query): Query<GenreQuery>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let movies = repository.list_by_genre(&query.genre).await?;
    Ok((StatusCode::OK, Json(movies)))
}

pub async fn get(
    Path(id): Path<i64>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn create(
    repository: MovieRepository,
    Garde(Json(payload)): Garde<Json<CreateMovie>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.create(payload).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("movie/{}", record.id))],
        Json(record),
    ))
}

pub async fn update(
    Path(id): Path<i64>,
    repository: MovieRepository,
    Garde(Json(payload)): Garde<Json<UpdateMovie>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(id, payload).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(
    Path(id): Path<i64>,
    repository: MovieRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.delete(id).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn search(
    repository: MovieRepository,
    Json(request): Json<MovieSearchRequest>,
) -> ApiResult<impl IntoResponse> {
    let movies = repository.search(&request).await?;
    Ok((StatusCode::OK, Json(movies)))
}

pub fn router() -> axum::Router<crate::state::AppState> {
    axum::Router::new()
        .route("/all", axum::routing::get(list_all))
        .route("/genre", axum::routing::get(list_by_genre))
        .route("/search", axum::routing::post(search))
        .route("/", axum::routing::post(create))
        .route("/{id}", axum::routing::get(get).put(update).delete(delete))
}
