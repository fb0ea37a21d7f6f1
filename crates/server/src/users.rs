//! Account and user administration endpoints.

use api_types::user::{
    AccountUpdate, AdminCheck, AdminUserNew, AdminUserUpdate, UserNew, UserRole, UserView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CreateUserCmd, RegisterUserCmd, UpdateAccountCmd, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

/// Public sign up. New accounts are always `common`.
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(RegisterUserCmd {
            name: payload.name,
            email: payload.email,
            password: payload.password,
            password_confirmation: payload.password_confirmation,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(views::user(user))))
}

pub async fn me(Extension(user): Extension<User>) -> Json<UserView> {
    Json(views::user(user))
}

pub async fn update_account(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<AccountUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let updated = state
        .engine
        .update_account(
            UpdateAccountCmd {
                current_password: payload.current_password,
                name: payload.name,
                email: payload.email,
                new_password: payload.new_password,
                new_password_confirmation: payload.new_password_confirmation,
            },
            user.id,
        )
        .await?;
    Ok(Json(views::user(updated)))
}

pub async fn admin_check(Extension(user): Extension<User>) -> Json<AdminCheck> {
    Json(AdminCheck {
        is_admin: user.role == engine::UserRole::Admin,
    })
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<UserView>>, ServerError> {
    let users = state.engine.list_users(user.id).await?;
    Ok(Json(users.into_iter().map(views::user).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<AdminUserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let role = payload.role.map(views::role_to_engine).unwrap_or_default();
    let created = state
        .engine
        .create_user(
            CreateUserCmd {
                name: payload.name,
                email: payload.email,
                password: payload.password,
                role,
            },
            user.id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::user(created))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    let found = state.engine.admin_user(id, user.id).await?;
    Ok(Json(views::user(found)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUserUpdate>,
) -> Result<Json<UserView>, ServerError> {
    let updated = state
        .engine
        .admin_update_user(id, payload.name.as_deref(), payload.email.as_deref(), user.id)
        .await?;
    Ok(Json(views::user(updated)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_user(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_role(
    state: &ServerState,
    id: Uuid,
    role: UserRole,
    actor: &User,
) -> Result<Json<UserView>, ServerError> {
    let updated = state
        .engine
        .set_user_role(id, views::role_to_engine(role), actor.id)
        .await?;
    tracing::info!("{} set role of {} to {:?}", actor.email, updated.email, role);
    Ok(Json(views::user(updated)))
}

pub async fn promote(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    set_role(&state, id, UserRole::Admin, &user).await
}

pub async fn demote(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    set_role(&state, id, UserRole::Common, &user).await
}

pub async fn make_lawyer(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    set_role(&state, id, UserRole::Lawyer, &user).await
}
