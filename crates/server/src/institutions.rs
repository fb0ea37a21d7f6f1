use api_types::institution::{
    BalancesRecompute, InstitutionList, InstitutionNew, InstitutionUpdate, InstitutionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{InstitutionCmd, InstitutionListFilter, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<InstitutionList>,
) -> Result<Json<Vec<InstitutionView>>, ServerError> {
    let filter = InstitutionListFilter {
        profile_id: query.profile_id,
        kind: query.kind,
    };
    let institutions = state.engine.list_institutions(&filter, user.id).await?;
    Ok(Json(
        institutions.into_iter().map(views::institution).collect(),
    ))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<InstitutionNew>,
) -> Result<(StatusCode, Json<InstitutionView>), ServerError> {
    let institution = state
        .engine
        .create_institution(
            payload.profile_id,
            InstitutionCmd {
                name: payload.name,
                kind: payload.kind,
                opening_balance_minor: payload.opening_balance_minor,
            },
            user.id,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(views::institution(institution))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InstitutionView>, ServerError> {
    let institution = state.engine.institution(id, user.id).await?;
    Ok(Json(views::institution(institution)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<InstitutionUpdate>,
) -> Result<Json<InstitutionView>, ServerError> {
    let institution = state
        .engine
        .update_institution(
            id,
            InstitutionCmd {
                name: payload.name,
                kind: payload.kind,
                opening_balance_minor: payload.opening_balance_minor,
            },
            user.id,
        )
        .await?;
    Ok(Json(views::institution(institution)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_institution(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rebuild balances from opening balances and booked transactions.
pub async fn recompute(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BalancesRecompute>,
) -> Result<Json<Vec<InstitutionView>>, ServerError> {
    let institutions = state
        .engine
        .recompute_balances(payload.profile_id, user.id)
        .await?;
    tracing::info!(
        "{} recomputed {} institution balances",
        user.email,
        institutions.len()
    );
    Ok(Json(
        institutions.into_iter().map(views::institution).collect(),
    ))
}
