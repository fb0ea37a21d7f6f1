use api_types::summary::{Summary, SummaryGet};
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use engine::{SummaryQuery, User};

use crate::{ServerError, server::ServerState, views};

/// Income, expense and per-category totals over a date range.
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<SummaryGet>,
) -> Result<Json<Summary>, ServerError> {
    let summary = state
        .engine
        .financial_summary(
            &SummaryQuery {
                profile_id: query.profile_id,
                from: query.from,
                to: query.to,
            },
            user.id,
        )
        .await?;
    Ok(Json(views::summary(summary)))
}
