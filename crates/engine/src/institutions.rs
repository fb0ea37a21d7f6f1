//! The module contains `Institution`: a bank account, card or any other place
//! where money is kept.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An institution of a profile.
///
/// `balance_minor` starts at `opening_balance_minor` and moves with every
/// transaction booked against the institution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub kind: String,
    pub opening_balance_minor: i64,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl Institution {
    pub fn new(profile_id: Uuid, name: String, kind: String, opening_balance_minor: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            name,
            kind,
            opening_balance_minor,
            balance_minor: opening_balance_minor,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "institutions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub kind: String,
    pub opening_balance_minor: i64,
    pub balance_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profiles::Entity",
        from = "Column::ProfileId",
        to = "super::profiles::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Profile,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Institution> for ActiveModel {
    fn from(institution: &Institution) -> Self {
        Self {
            id: ActiveValue::Set(institution.id),
            profile_id: ActiveValue::Set(institution.profile_id),
            name: ActiveValue::Set(institution.name.clone()),
            kind: ActiveValue::Set(institution.kind.clone()),
            opening_balance_minor: ActiveValue::Set(institution.opening_balance_minor),
            balance_minor: ActiveValue::Set(institution.balance_minor),
            created_at: ActiveValue::Set(institution.created_at),
        }
    }
}

impl From<Model> for Institution {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            profile_id: model.profile_id,
            name: model.name,
            kind: model.kind,
            opening_balance_minor: model.opening_balance_minor,
            balance_minor: model.balance_minor,
            created_at: model.created_at,
        }
    }
}
