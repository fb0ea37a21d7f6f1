//! Law-office clients. Every client belongs to the lawyer who registered it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub name: String,
    /// CPF or CNPJ, formatted or not.
    pub tax_id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_cases: u64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub name: String,
    pub tax_id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LawyerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Lawyer,
    #[sea_orm(has_many = "super::cases::Entity")]
    Cases,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lawyer.def()
    }
}

impl Related<super::cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Client> for ActiveModel {
    fn from(client: &Client) -> Self {
        Self {
            id: ActiveValue::Set(client.id),
            lawyer_id: ActiveValue::Set(client.lawyer_id),
            name: ActiveValue::Set(client.name.clone()),
            tax_id: ActiveValue::Set(client.tax_id.clone()),
            phone: ActiveValue::Set(client.phone.clone()),
            email: ActiveValue::Set(client.email.clone()),
            address: ActiveValue::Set(client.address.clone()),
            city: ActiveValue::Set(client.city.clone()),
            state: ActiveValue::Set(client.state.clone()),
            postal_code: ActiveValue::Set(client.postal_code.clone()),
            notes: ActiveValue::Set(client.notes.clone()),
            created_at: ActiveValue::Set(client.created_at),
            updated_at: ActiveValue::Set(client.updated_at),
        }
    }
}

/// Converts a stored row plus its number of cases.
impl From<(Model, u64)> for Client {
    fn from((model, total_cases): (Model, u64)) -> Self {
        Self {
            id: model.id,
            lawyer_id: model.lawyer_id,
            name: model.name,
            tax_id: model.tax_id,
            phone: model.phone,
            email: model.email,
            address: model.address,
            city: model.city,
            state: model.state,
            postal_code: model.postal_code,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
            total_cases,
        }
    }
}
