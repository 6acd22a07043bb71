//! Genre API endpoints

use api_types::{
    Success,
    genre::{GenreColorUpdate, GenreCreate, GenreRename, GenreView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::Genre;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user::AuthUser};

pub(crate) fn genre_view(genre: Genre) -> GenreView {
    GenreView {
        id: genre.id,
        name: genre.name,
        color: genre.color,
        is_calendar_target: genre.is_calendar_target,
        created_at: genre.created_at,
        updated_at: genre.updated_at,
    }
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<GenreView>>, ServerError> {
    let genres = state.engine.for_user(&user.username).genres().await?;
    Ok(Json(genres.into_iter().map(genre_view).collect()))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<GenreCreate>,
) -> Result<Json<GenreView>, ServerError> {
    let genre = state
        .engine
        .for_user(&user.username)
        .create_genre(&payload.name, payload.color)
        .await?;
    Ok(Json(genre_view(genre)))
}

pub async fn rename(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GenreRename>,
) -> Result<Json<GenreView>, ServerError> {
    let genre = state
        .engine
        .for_user(&user.username)
        .rename_genre(id, &payload.name)
        .await?;
    Ok(Json(genre_view(genre)))
}

pub async fn update_color(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<GenreColorUpdate>,
) -> Result<Json<GenreView>, ServerError> {
    let genre = state
        .engine
        .for_user(&user.username)
        .update_genre_color(id, payload.color)
        .await?;
    Ok(Json(genre_view(genre)))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Success>, ServerError> {
    state
        .engine
        .for_user(&user.username)
        .delete_genre(id)
        .await?;
    Ok(Json(Success::ok()))
}

/// Make the genre the only calendar target of the caller.
pub async fn set_calendar_target(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GenreView>, ServerError> {
    let genre = state
        .engine
        .for_user(&user.username)
        .set_calendar_target(id)
        .await?;
    Ok(Json(genre_view(genre)))
}
