use api_types::transaction::{
    InstallmentsDeleted, InstallmentsNew, TransactionList, TransactionNew, TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{InstallmentsCmd, TransactionCmd, TransactionListFilter, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

fn transaction_cmd(payload: TransactionNew) -> TransactionCmd {
    TransactionCmd {
        profile_id: payload.profile_id,
        institution_id: payload.institution_id,
        category_id: payload.category_id,
        subcategory_id: payload.subcategory_id,
        occurred_on: payload.occurred_on,
        description: payload.description,
        amount_minor: payload.amount_minor,
        kind: views::kind_to_engine(payload.kind),
        destination_profile_id: payload.destination_profile_id,
        destination_institution_id: payload.destination_institution_id,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<TransactionList>,
) -> Result<Json<Vec<TransactionView>>, ServerError> {
    let filter = TransactionListFilter {
        profile_id: query.profile_id,
        kind: query.kind.map(views::kind_to_engine),
        category_id: query.category_id,
        institution_id: query.institution_id,
        from: query.from,
        to: query.to,
    };
    let transactions = state.engine.list_transactions(&filter, user.id).await?;
    Ok(Json(
        transactions.into_iter().map(views::transaction).collect(),
    ))
}

/// Book a transaction. For a profile transfer the outgoing leg is returned.
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let tx = state
        .engine
        .create_transaction(transaction_cmd(payload), user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(views::transaction(tx))))
}

pub async fn installments(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<InstallmentsNew>,
) -> Result<(StatusCode, Json<Vec<TransactionView>>), ServerError> {
    let rows = state
        .engine
        .create_installments(
            InstallmentsCmd {
                transaction: transaction_cmd(payload.transaction),
                installment_count: payload.installment_count,
            },
            user.id,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(rows.into_iter().map(views::transaction).collect()),
    ))
}

pub async fn remove_installments(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(group): Path<Uuid>,
) -> Result<Json<InstallmentsDeleted>, ServerError> {
    let removed = state
        .engine
        .delete_installment_group(group, user.id)
        .await?;
    Ok(Json(InstallmentsDeleted { removed }))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id, user.id).await?;
    Ok(Json(views::transaction(tx)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionNew>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state
        .engine
        .update_transaction(id, transaction_cmd(payload), user.id)
        .await?;
    Ok(Json(views::transaction(tx)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_transaction(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
