use api_types::{
    Search,
    case::{CaseList, CaseNew, CaseStats, CaseView, FeePayment, FeeTotals},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{CaseCmd, CaseListFilter, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

fn case_cmd(payload: CaseNew) -> CaseCmd {
    CaseCmd {
        client_id: payload.client_id,
        process_number: payload.process_number,
        description: payload.description,
        status: payload.status.map(views::status_to_engine),
        start_date: payload.start_date,
        end_date: payload.end_date,
        fee_minor: payload.fee_minor,
        fees_paid_minor: payload.fees_paid_minor,
        notes: payload.notes,
    }
}

fn case_list(cases: Vec<engine::Case>) -> Json<Vec<CaseView>> {
    Json(cases.into_iter().map(views::case).collect())
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<CaseList>,
) -> Result<Json<Vec<CaseView>>, ServerError> {
    let filter = CaseListFilter {
        status: query.status.map(views::status_to_engine),
        start_from: query.start_from,
        start_to: query.start_to,
    };
    Ok(case_list(state.engine.list_cases(&filter, user.id).await?))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CaseNew>,
) -> Result<(StatusCode, Json<CaseView>), ServerError> {
    let case = state.engine.create_case(case_cmd(payload), user.id).await?;
    Ok((StatusCode::CREATED, Json(views::case(case))))
}

/// Match process number, description or client name.
pub async fn search(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(search): Query<Search>,
) -> Result<Json<Vec<CaseView>>, ServerError> {
    Ok(case_list(
        state.engine.search_cases(&search.q, user.id).await?,
    ))
}

/// Cases with a fee that is not fully paid.
pub async fn open_fees(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<CaseView>>, ServerError> {
    Ok(case_list(state.engine.open_fee_cases(user.id).await?))
}

pub async fn fees(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<FeeTotals>, ServerError> {
    let totals = state.engine.fee_totals(user.id).await?;
    Ok(Json(views::fee_totals(totals)))
}

pub async fn stats(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<CaseStats>, ServerError> {
    let stats = state.engine.case_stats(user.id).await?;
    Ok(Json(views::case_stats(stats)))
}

pub async fn by_client(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(client_id): Path<Uuid>,
) -> Result<Json<Vec<CaseView>>, ServerError> {
    Ok(case_list(
        state.engine.cases_by_client(client_id, user.id).await?,
    ))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CaseView>, ServerError> {
    let case = state.engine.case(id, user.id).await?;
    Ok(Json(views::case(case)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CaseNew>,
) -> Result<Json<CaseView>, ServerError> {
    let case = state
        .engine
        .update_case(id, case_cmd(payload), user.id)
        .await?;
    Ok(Json(views::case(case)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_case(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn pay_fee(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FeePayment>,
) -> Result<Json<CaseView>, ServerError> {
    let case = state
        .engine
        .register_fee_payment(id, payload.amount_minor, user.id)
        .await?;
    tracing::info!(
        "fee payment of {} registered on case {}",
        payload.amount_minor,
        case.process_number
    );
    Ok(Json(views::case(case)))
}
