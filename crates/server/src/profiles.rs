use api_types::profile::{ProfileNew, ProfileView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ProfileView>>, ServerError> {
    let profiles = state.engine.list_profiles(user.id).await?;
    Ok(Json(profiles.into_iter().map(views::profile).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ProfileNew>,
) -> Result<(StatusCode, Json<ProfileView>), ServerError> {
    let profile = state
        .engine
        .create_profile(
            &payload.name,
            views::profile_kind_to_engine(payload.kind),
            user.id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::profile(profile))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state.engine.profile(id, user.id).await?;
    Ok(Json(views::profile(profile)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ProfileNew>,
) -> Result<Json<ProfileView>, ServerError> {
    let profile = state
        .engine
        .update_profile(
            id,
            &payload.name,
            views::profile_kind_to_engine(payload.kind),
            user.id,
        )
        .await?;
    Ok(Json(views::profile(profile)))
}

/// Delete a profile with everything booked in it.
pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_profile(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
