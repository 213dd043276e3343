use axum::{Json, extract::Path, response::IntoResponse};
use http::{StatusCode, header};
use mms_dal::genre::GenreRepository;

use crate::error::{ApiError, ApiResult};

crate::repository_from_request!(GenreRepository);

const MAX_NAME_LENGTH: usize = 255;

/// The genre name arrives as the raw request body, so it is checked
/// here instead of going through the payload validation layer.
fn checked_name(name: String) -> ApiResult<String> {
    if name.is_empty() {
        return Err(ApiError::InvalidRequest(
            "Genre name must not be empty".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(ApiError::InvalidRequest("Genre name is too long".to_string()));
    }
    Ok(name)
}

pub async fn list_all(repository: GenreRepository) -> ApiResult<impl IntoResponse> {
    let genres = repository.list_all().await?;
    Ok((StatusCode::OK, Json(genres)))
}

pub async fn get(
    Path(id): Path<i64>,
    repository: GenreRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn create(repository: GenreRepository, name: String) -> ApiResult<impl IntoResponse> {
    let name = checked_name(name)?;
    let record = repository.create(&name).await?;

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("genre/{}", record.id))],
        Json(record),
    ))
}

pub async fn update(
    Path(id): Path<i64>,
    repository: GenreRepository,
    name: String,
) -> ApiResult<impl IntoResponse> {
    let name = checked_name(name)?;
    let record = repository.update(id, &name).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(
    Path(id): Path<i64>,
    repository: GenreRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.delete(id).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub fn router() -> axum::Router<crate::state::AppState> {
    axum::Router::new()
        .route("/all", axum::routing::get(list_all))
        .route("/", axum::routing::post(create))
        .route("/{id}", axum::routing::get(get).put(update).delete(delete))
}
