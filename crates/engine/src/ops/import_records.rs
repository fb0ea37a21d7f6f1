use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ImportRecord, ImportRecordCmd, ResultEngine, import_records,
    util::{ensure_date_range, ensure_not_future},
};

use super::{Engine, with_tx};

/// Filters for listing import records. Dates bound `extracted_on`,
/// both inclusive.
#[derive(Clone, Debug, Default)]
pub struct ImportRecordListFilter {
    pub bank: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

fn required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

impl Engine {
    /// Record that a bank statement file was imported.
    pub async fn create_import_record(
        &self,
        cmd: ImportRecordCmd,
        user_id: Uuid,
    ) -> ResultEngine<ImportRecord> {
        ensure_not_future(cmd.extracted_on, "extraction date")?;
        let bank = required(&cmd.bank, "bank")?;
        let period = required(&cmd.period, "period")?;
        let file_name = required(&cmd.file_name, "file name")?;
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.ensure_file_name_free(&db_tx, user_id, &file_name, None)
                .await?;

            let record = ImportRecord {
                id: Uuid::new_v4(),
                user_id,
                extracted_on: cmd.extracted_on,
                bank,
                period,
                file_name,
                created_at: Utc::now(),
            };
            import_records::ActiveModel::from(&record)
                .insert(&db_tx)
                .await?;
            Ok(record)
        })
    }

    pub async fn import_record(&self, record_id: Uuid, user_id: Uuid) -> ResultEngine<ImportRecord> {
        with_tx!(self, |db_tx| {
            let model = self.require_import_record(&db_tx, record_id, user_id).await?;
            Ok(ImportRecord::from(model))
        })
    }

    /// List the caller's import records, latest extraction first.
    pub async fn list_import_records(
        &self,
        filter: &ImportRecordListFilter,
        user_id: Uuid,
    ) -> ResultEngine<Vec<ImportRecord>> {
        ensure_date_range(filter.from, filter.to)?;
        with_tx!(self, |db_tx| {
            let mut query = import_records::Entity::find()
                .filter(import_records::Column::UserId.eq(user_id));
            if let Some(bank) = filter.bank.as_deref().map(str::trim).filter(|b| !b.is_empty()) {
                query = query.filter(import_records::Column::Bank.contains(bank));
            }
            if let Some(from) = filter.from {
                query = query.filter(import_records::Column::ExtractedOn.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(import_records::Column::ExtractedOn.lte(to));
            }
            let models = query
                .order_by_desc(import_records::Column::ExtractedOn)
                .order_by_desc(import_records::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(ImportRecord::from).collect())
        })
    }

    pub async fn update_import_record(
        &self,
        record_id: Uuid,
        cmd: ImportRecordCmd,
        user_id: Uuid,
    ) -> ResultEngine<ImportRecord> {
        ensure_not_future(cmd.extracted_on, "extraction date")?;
        let bank = required(&cmd.bank, "bank")?;
        let period = required(&cmd.period, "period")?;
        let file_name = required(&cmd.file_name, "file name")?;
        with_tx!(self, |db_tx| {
            let model = self.require_import_record(&db_tx, record_id, user_id).await?;
            self.ensure_file_name_free(&db_tx, user_id, &file_name, Some(model.id))
                .await?;
            let active = import_records::ActiveModel {
                id: ActiveValue::Set(model.id),
                extracted_on: ActiveValue::Set(cmd.extracted_on),
                bank: ActiveValue::Set(bank),
                period: ActiveValue::Set(period),
                file_name: ActiveValue::Set(file_name),
                ..Default::default()
            };
            Ok(ImportRecord::from(active.update(&db_tx).await?))
        })
    }

    pub async fn delete_import_record(&self, record_id: Uuid, user_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_import_record(&db_tx, record_id, user_id).await?;
            import_records::Entity::delete_by_id(record_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn require_import_record(
        &self,
        db: &DatabaseTransaction,
        record_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<import_records::Model> {
        import_records::Entity::find_by_id(record_id)
            .filter(import_records::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("import record not exists".to_string()))
    }

    async fn ensure_file_name_free(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        file_name: &str,
        except: Option<Uuid>,
    ) -> ResultEngine<()> {
        let mut query = import_records::Entity::find()
            .filter(import_records::Column::UserId.eq(user_id))
            .filter(import_records::Column::FileName.eq(file_name));
        if let Some(id) = except {
            query = query.filter(import_records::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(file_name.to_string()));
        }
        Ok(())
    }
}
