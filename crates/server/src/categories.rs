//! Categories and their subcategories.

use api_types::category::{
    CategoryList, CategoryNew, CategoryUpdate, CategoryView, SubcategoryList, SubcategoryNew,
    SubcategoryUpdate, SubcategoryView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<CategoryList>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let categories = state
        .engine
        .list_categories(
            query.profile_id,
            query.kind.map(views::kind_to_engine),
            user.id,
        )
        .await?;
    Ok(Json(categories.into_iter().map(views::category).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(
            payload.profile_id,
            &payload.name,
            views::kind_to_engine(payload.kind),
            user.id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::category(category))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state.engine.category(id, user.id).await?;
    Ok(Json(views::category(category)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryView>, ServerError> {
    let category = state
        .engine
        .update_category(id, &payload.name, views::kind_to_engine(payload.kind), user.id)
        .await?;
    Ok(Json(views::category(category)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_category(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_subcategories(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<SubcategoryList>,
) -> Result<Json<Vec<SubcategoryView>>, ServerError> {
    let subcategories = state
        .engine
        .list_subcategories(query.category_id, user.id)
        .await?;
    Ok(Json(
        subcategories.into_iter().map(views::subcategory).collect(),
    ))
}

pub async fn create_subcategory(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<SubcategoryNew>,
) -> Result<(StatusCode, Json<SubcategoryView>), ServerError> {
    let subcategory = state
        .engine
        .create_subcategory(payload.category_id, &payload.name, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(views::subcategory(subcategory))))
}

pub async fn get_subcategory(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubcategoryView>, ServerError> {
    let subcategory = state.engine.subcategory(id, user.id).await?;
    Ok(Json(views::subcategory(subcategory)))
}

pub async fn update_subcategory(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubcategoryUpdate>,
) -> Result<Json<SubcategoryView>, ServerError> {
    let subcategory = state
        .engine
        .update_subcategory(id, &payload.name, payload.category_id, user.id)
        .await?;
    Ok(Json(views::subcategory(subcategory)))
}

pub async fn remove_subcategory(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_subcategory(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
