use api_types::import_record::{ImportRecordList, ImportRecordNew, ImportRecordView};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{ImportRecordCmd, ImportRecordListFilter, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

fn record_cmd(payload: ImportRecordNew) -> ImportRecordCmd {
    ImportRecordCmd {
        extracted_on: payload.extracted_on,
        bank: payload.bank,
        period: payload.period,
        file_name: payload.file_name,
    }
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<ImportRecordList>,
) -> Result<Json<Vec<ImportRecordView>>, ServerError> {
    let filter = ImportRecordListFilter {
        bank: query.bank,
        from: query.from,
        to: query.to,
    };
    let records = state.engine.list_import_records(&filter, user.id).await?;
    Ok(Json(records.into_iter().map(views::import_record).collect()))
}

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ImportRecordNew>,
) -> Result<(StatusCode, Json<ImportRecordView>), ServerError> {
    let record = state
        .engine
        .create_import_record(record_cmd(payload), user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(views::import_record(record))))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ImportRecordView>, ServerError> {
    let record = state.engine.import_record(id, user.id).await?;
    Ok(Json(views::import_record(record)))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ImportRecordNew>,
) -> Result<Json<ImportRecordView>, ServerError> {
    let record = state
        .engine
        .update_import_record(id, record_cmd(payload), user.id)
        .await?;
    Ok(Json(views::import_record(record)))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_import_record(id, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
