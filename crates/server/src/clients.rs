//! Law-office clients. Every endpoint requires the `lawyer` or `admin` role
//! and only sees the caller's own clients.

use api_types::{
    Search,
    client::{ClientCount, ClientList, ClientNew, ClientView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{ClientCmd, ClientListFilter, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

fn client_cmd(payload: ClientNew) -> ClientCmd {
    ClientCmd {
        name: payload.name,
        tax_id: payload.tax_id,
        phone: payload.phone,
        email: payload.email,
        address: payload.address,
        city: payload.city,
        state: payload.state,
        postal_code: payload.postal_code,
        notes: payload.notes,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ClientList>,
) -> Result<Json<Vec<ClientView>>, ServerError> {
    let filter = ClientListFilter {
        city: query.city,
        state: query.state,
    };
    let clients = state.engine.list_clients(&filter, user.id).await?;
    Ok(Json(clients.into_iter().map(views::client).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ClientNew>,
) -> Result<(StatusCode, Json<ClientView>), ServerError> {
    let client = state
        .engine
        .create_client(client_cmd(payload), user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(views::client(client))))
}

pub async fn search(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(search): Query<Search>,
) -> Result<Json<Vec<ClientView>>, ServerError> {
    let clients = state.engine.search_clients(&search.q, user.id).await?;
    Ok(Json(clients.into_iter().map(views::client).collect()))
}

pub async fn count(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<ClientCount>, ServerError> {
    let count = state.engine.count_clients(user.id).await?;
    Ok(Json(ClientCount { count }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClientView>, ServerError> {
    let client = state.engine.client(id, user.id).await?;
    Ok(Json(views::client(client)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClientNew>,
) -> Result<Json<ClientView>, ServerError> {
    let client = state
        .engine
        .update_client(id, client_cmd(payload), user.id)
        .await?;
    Ok(Json(views::client(client)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_client(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
