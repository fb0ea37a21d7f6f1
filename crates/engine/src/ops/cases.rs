use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use sea_orm::{
    ActiveValue, Condition, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*, sea_query::Expr,
};

use crate::{
    Case, CaseCmd, CaseStatus, EngineError, MoneyCents, ResultEngine, cases, clients,
    util::{bounded_text, ensure_date_range},
};

use super::{Engine, normalize_optional_text, with_tx};

/// Filters for listing cases. `start_from` and `start_to` bound the start
/// date, both inclusive.
#[derive(Clone, Debug, Default)]
pub struct CaseListFilter {
    pub status: Option<CaseStatus>,
    pub start_from: Option<NaiveDate>,
    pub start_to: Option<NaiveDate>,
}

/// Number of cases per status. Every status is listed, zeros included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CaseStats {
    pub total: u64,
    pub by_status: Vec<(CaseStatus, u64)>,
}

/// Fee amounts over the cases that have a fee.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FeeTotals {
    pub total: i64,
    pub paid: i64,
    pub remaining: i64,
}

struct CaseFields {
    process_number: String,
    description: String,
    status: CaseStatus,
    end_date: Option<NaiveDate>,
    fee_minor: Option<i64>,
    fees_paid_minor: i64,
    notes: Option<String>,
}

fn case_fields(cmd: &CaseCmd) -> ResultEngine<CaseFields> {
    if let Some(end) = cmd.end_date
        && end < cmd.start_date
    {
        return Err(EngineError::InvalidInput(
            "end_date must not be before start_date".to_string(),
        ));
    }
    if let Some(fee) = cmd.fee_minor
        && fee <= 0
    {
        return Err(EngineError::InvalidAmount(
            "fee_minor must be > 0".to_string(),
        ));
    }
    if let Some(fee) = cmd.fee_minor {
        MoneyCents::bounded(fee, "fee_minor")?;
    }
    let fees_paid_minor = cmd.fees_paid_minor.unwrap_or_default();
    if fees_paid_minor < 0 {
        return Err(EngineError::InvalidAmount(
            "fees_paid_minor must be >= 0".to_string(),
        ));
    }
    MoneyCents::bounded(fees_paid_minor, "fees_paid_minor")?;
    Ok(CaseFields {
        process_number: bounded_text(&cmd.process_number, "process number", 1, 50)?,
        description: bounded_text(&cmd.description, "case description", 10, 500)?,
        status: cmd.status.unwrap_or_default(),
        end_date: cmd.end_date,
        fee_minor: cmd.fee_minor,
        fees_paid_minor,
        notes: normalize_optional_text(cmd.notes.as_deref()),
    })
}

impl Engine {
    /// Open a case for one of the lawyer's clients.
    pub async fn create_case(&self, cmd: CaseCmd, lawyer_id: Uuid) -> ResultEngine<Case> {
        let fields = case_fields(&cmd)?;
        with_tx!(self, |db_tx| {
            let lawyer = self.require_lawyer(&db_tx, lawyer_id).await?;
            let client = self.require_client(&db_tx, cmd.client_id, lawyer_id).await?;
            self.ensure_process_number_free(&db_tx, lawyer_id, &fields.process_number, None)
                .await?;

            let now = Utc::now();
            let case = Case {
                id: Uuid::new_v4(),
                lawyer_id,
                lawyer_name: lawyer.name,
                client_id: client.id,
                client_name: client.name,
                client_tax_id: client.tax_id,
                process_number: fields.process_number,
                description: fields.description,
                status: fields.status,
                start_date: cmd.start_date,
                end_date: fields.end_date,
                fee_minor: fields.fee_minor,
                fees_paid_minor: fields.fees_paid_minor,
                notes: fields.notes,
                created_at: now,
                updated_at: now,
            };
            cases::ActiveModel::from(&case).insert(&db_tx).await?;
            tracing::debug!(case = %case.id, "case opened");
            Ok(case)
        })
    }

    pub async fn case(&self, case_id: Uuid, lawyer_id: Uuid) -> ResultEngine<Case> {
        with_tx!(self, |db_tx| {
            let lawyer = self.require_lawyer(&db_tx, lawyer_id).await?;
            let model = self.require_case(&db_tx, case_id, lawyer_id).await?;
            let client = self.require_client(&db_tx, model.client_id, lawyer_id).await?;
            Case::try_from((model, &client, lawyer.name.as_str()))
        })
    }

    /// List the lawyer's cases, most recently started first.
    pub async fn list_cases(&self, filter: &CaseListFilter, lawyer_id: Uuid) -> ResultEngine<Vec<Case>> {
        ensure_date_range(filter.start_from, filter.start_to)?;
        with_tx!(self, |db_tx| {
            let lawyer = self.require_lawyer(&db_tx, lawyer_id).await?;
            let mut query = cases::Entity::find().filter(cases::Column::LawyerId.eq(lawyer_id));
            if let Some(status) = filter.status {
                query = query.filter(cases::Column::Status.eq(status.as_str()));
            }
            if let Some(from) = filter.start_from {
                query = query.filter(cases::Column::StartDate.gte(from));
            }
            if let Some(to) = filter.start_to {
                query = query.filter(cases::Column::StartDate.lte(to));
            }
            let models = query
                .order_by_desc(cases::Column::StartDate)
                .order_by_desc(cases::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.case_views(&db_tx, models, &lawyer.name, lawyer_id)
                .await
        })
    }

    pub async fn cases_by_client(&self, client_id: Uuid, lawyer_id: Uuid) -> ResultEngine<Vec<Case>> {
        with_tx!(self, |db_tx| {
            let lawyer = self.require_lawyer(&db_tx, lawyer_id).await?;
            let client = self.require_client(&db_tx, client_id, lawyer_id).await?;
            cases::Entity::find()
                .filter(cases::Column::ClientId.eq(client.id))
                .order_by_desc(cases::Column::StartDate)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| Case::try_from((model, &client, lawyer.name.as_str())))
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Cases whose process number, description or client name contains
    /// `term`.
    pub async fn search_cases(&self, term: &str, lawyer_id: Uuid) -> ResultEngine<Vec<Case>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(EngineError::InvalidInput(
                "search term must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let lawyer = self.require_lawyer(&db_tx, lawyer_id).await?;
            let models = cases::Entity::find()
                .inner_join(clients::Entity)
                .filter(cases::Column::LawyerId.eq(lawyer_id))
                .filter(
                    Condition::any()
                        .add(cases::Column::ProcessNumber.contains(term))
                        .add(cases::Column::Description.contains(term))
                        .add(clients::Column::Name.contains(term)),
                )
                .order_by_desc(cases::Column::StartDate)
                .all(&db_tx)
                .await?;
            self.case_views(&db_tx, models, &lawyer.name, lawyer_id)
                .await
        })
    }

    pub async fn update_case(&self, case_id: Uuid, cmd: CaseCmd, lawyer_id: Uuid) -> ResultEngine<Case> {
        let fields = case_fields(&cmd)?;
        with_tx!(self, |db_tx| {
            let lawyer = self.require_lawyer(&db_tx, lawyer_id).await?;
            let model = self.require_case(&db_tx, case_id, lawyer_id).await?;
            let client = self.require_client(&db_tx, cmd.client_id, lawyer_id).await?;
            self.ensure_process_number_free(
                &db_tx,
                lawyer_id,
                &fields.process_number,
                Some(model.id),
            )
            .await?;

            let active = cases::ActiveModel {
                id: ActiveValue::Set(model.id),
                client_id: ActiveValue::Set(client.id),
                process_number: ActiveValue::Set(fields.process_number),
                description: ActiveValue::Set(fields.description),
                status: ActiveValue::Set(fields.status.as_str().to_string()),
                start_date: ActiveValue::Set(cmd.start_date),
                end_date: ActiveValue::Set(fields.end_date),
                fee_minor: ActiveValue::Set(fields.fee_minor),
                fees_paid_minor: ActiveValue::Set(fields.fees_paid_minor),
                notes: ActiveValue::Set(fields.notes),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            let model = active.update(&db_tx).await?;
            Case::try_from((model, &client, lawyer.name.as_str()))
        })
    }

    pub async fn delete_case(&self, case_id: Uuid, lawyer_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            self.require_case(&db_tx, case_id, lawyer_id).await?;
            cases::Entity::delete_by_id(case_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Add a payment to the fees collected on a case.
    pub async fn register_fee_payment(
        &self,
        case_id: Uuid,
        amount_minor: i64,
        lawyer_id: Uuid,
    ) -> ResultEngine<Case> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "payment amount must be > 0".to_string(),
            ));
        }
        let amount = MoneyCents::bounded(amount_minor, "payment amount")?;
        with_tx!(self, |db_tx| {
            let lawyer = self.require_lawyer(&db_tx, lawyer_id).await?;
            let model = self.require_case(&db_tx, case_id, lawyer_id).await?;
            let paid = MoneyCents::new(model.fees_paid_minor).checked_add(amount)?;
            MoneyCents::bounded(paid.cents(), "fees_paid_minor")?;
            cases::Entity::update_many()
                .col_expr(cases::Column::FeesPaidMinor, Expr::value(paid.cents()))
                .col_expr(cases::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(cases::Column::Id.eq(model.id))
                .exec(&db_tx)
                .await?;

            let model = self.require_case(&db_tx, case_id, lawyer_id).await?;
            let client = self.require_client(&db_tx, model.client_id, lawyer_id).await?;
            tracing::debug!(case = %case_id, amount_minor, "fee payment registered");
            Case::try_from((model, &client, lawyer.name.as_str()))
        })
    }

    /// Cases with a fee that is not fully paid yet.
    pub async fn open_fee_cases(&self, lawyer_id: Uuid) -> ResultEngine<Vec<Case>> {
        with_tx!(self, |db_tx| {
            let lawyer = self.require_lawyer(&db_tx, lawyer_id).await?;
            let models = cases::Entity::find()
                .filter(cases::Column::LawyerId.eq(lawyer_id))
                .filter(cases::Column::FeeMinor.is_not_null())
                .filter(Expr::col(cases::Column::FeesPaidMinor).lt(Expr::col(cases::Column::FeeMinor)))
                .order_by_desc(cases::Column::StartDate)
                .all(&db_tx)
                .await?;
            self.case_views(&db_tx, models, &lawyer.name, lawyer_id)
                .await
        })
    }

    /// Contracted, collected and outstanding fees. Overpaid cases count as
    /// nothing outstanding.
    pub async fn fee_totals(&self, lawyer_id: Uuid) -> ResultEngine<FeeTotals> {
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            let rows: Vec<(Option<i64>, i64)> = cases::Entity::find()
                .filter(cases::Column::LawyerId.eq(lawyer_id))
                .filter(cases::Column::FeeMinor.is_not_null())
                .select_only()
                .column(cases::Column::FeeMinor)
                .column(cases::Column::FeesPaidMinor)
                .into_tuple()
                .all(&db_tx)
                .await?;

            let (mut total, mut paid_total, mut remaining) =
                (MoneyCents::default(), MoneyCents::default(), MoneyCents::default());
            for (fee, paid) in rows {
                let fee = MoneyCents::new(fee.unwrap_or_default());
                let paid = MoneyCents::new(paid);
                total = total.checked_add(fee)?;
                paid_total = paid_total.checked_add(paid)?;
                let outstanding = fee.checked_sub(paid)?.max(MoneyCents::default());
                remaining = remaining.checked_add(outstanding)?;
            }
            Ok(FeeTotals {
                total: total.cents(),
                paid: paid_total.cents(),
                remaining: remaining.cents(),
            })
        })
    }

    pub async fn case_stats(&self, lawyer_id: Uuid) -> ResultEngine<CaseStats> {
        with_tx!(self, |db_tx| {
            self.require_lawyer(&db_tx, lawyer_id).await?;
            let counts: HashMap<String, i64> = cases::Entity::find()
                .filter(cases::Column::LawyerId.eq(lawyer_id))
                .select_only()
                .column(cases::Column::Status)
                .column_as(Expr::col(cases::Column::Id).count(), "total")
                .group_by(cases::Column::Status)
                .into_tuple::<(String, i64)>()
                .all(&db_tx)
                .await?
                .into_iter()
                .collect();

            let by_status: Vec<(CaseStatus, u64)> = CaseStatus::ALL
                .into_iter()
                .map(|status| {
                    let count = counts.get(status.as_str()).copied().unwrap_or_default();
                    (status, u64::try_from(count).unwrap_or_default())
                })
                .collect();
            Ok(CaseStats {
                total: by_status.iter().map(|(_, count)| count).sum(),
                by_status,
            })
        })
    }

    async fn ensure_process_number_free(
        &self,
        db: &DatabaseTransaction,
        lawyer_id: Uuid,
        process_number: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = cases::Entity::find()
            .filter(cases::Column::LawyerId.eq(lawyer_id))
            .filter(cases::Column::ProcessNumber.eq(process_number));
        if let Some(id) = except {
            query = query.filter(cases::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(process_number.to_string()));
        }
        Ok(())
    }

    async fn case_views(
        &self,
        db: &DatabaseTransaction,
        models: Vec<cases::Model>,
        lawyer_name: &str,
        lawyer_id: Uuid,
    ) -> ResultEngine<Vec<Case>> {
        let clients: HashMap<Uuid, clients::Model> = clients::Entity::find()
            .filter(clients::Column::LawyerId.eq(lawyer_id))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        models
            .into_iter()
            .map(|model| {
                let client = clients
                    .get(&model.client_id)
                    .ok_or_else(|| EngineError::KeyNotFound("client not exists".to_string()))?;
                Case::try_from((model, client, lawyer_name))
            })
            .collect()
    }
}
