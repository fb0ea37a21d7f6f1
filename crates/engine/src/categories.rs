//! Category registry per profile.
//!
//! A category is either an income or an expense category; transactions may
//! only use a category of their own kind. System categories are created by
//! the engine (profile transfers) and cannot be edited by users.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Subcategory, TransactionKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub kind: TransactionKind,
    pub is_system: bool,
    pub created_at: DateTime<Utc>,
    pub subcategories: Vec<Subcategory>,
}

impl Category {
    pub fn new(profile_id: Uuid, name: String, kind: TransactionKind, is_system: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            name,
            kind,
            is_system,
            created_at: Utc::now(),
            subcategories: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub profile_id: Uuid,
    pub name: String,
    pub kind: String,
    pub is_system: bool,
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
    #[sea_orm(has_many = "super::subcategories::Entity")]
    Subcategories,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::subcategories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subcategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: ActiveValue::Set(category.id),
            profile_id: ActiveValue::Set(category.profile_id),
            name: ActiveValue::Set(category.name.clone()),
            kind: ActiveValue::Set(category.kind.as_str().to_string()),
            is_system: ActiveValue::Set(category.is_system),
            created_at: ActiveValue::Set(category.created_at),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            profile_id: model.profile_id,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            name: model.name,
            is_system: model.is_system,
            created_at: model.created_at,
            subcategories: Vec::new(),
        })
    }
}
