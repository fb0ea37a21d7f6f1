//! Log of imported bank statements.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Day the statement was extracted from the bank.
    pub extracted_on: NaiveDate,
    pub bank: String,
    /// Free-form period covered by the statement, e.g. `2024-03`.
    pub period: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "import_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub extracted_on: Date,
    pub bank: String,
    pub period: String,
    pub file_name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ImportRecord> for ActiveModel {
    fn from(record: &ImportRecord) -> Self {
        Self {
            id: ActiveValue::Set(record.id),
            user_id: ActiveValue::Set(record.user_id),
            extracted_on: ActiveValue::Set(record.extracted_on),
            bank: ActiveValue::Set(record.bank.clone()),
            period: ActiveValue::Set(record.period.clone()),
            file_name: ActiveValue::Set(record.file_name.clone()),
            created_at: ActiveValue::Set(record.created_at),
        }
    }
}

impl From<Model> for ImportRecord {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            extracted_on: model.extracted_on,
            bank: model.bank,
            period: model.period,
            file_name: model.file_name,
            created_at: model.created_at,
        }
    }
}
