//! Profiles group a user's institutions, categories and transactions.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// Personal (`PF`) or business (`PJ`) profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfileKind {
    #[default]
    #[serde(rename = "PF")]
    Pf,
    #[serde(rename = "PJ")]
    Pj,
}

impl ProfileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pf => "PF",
            Self::Pj => "PJ",
        }
    }
}

impl TryFrom<&str> for ProfileKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "PF" => Ok(Self::Pf),
            "PJ" => Ok(Self::Pj),
            other => Err(EngineError::InvalidInput(format!(
                "invalid profile kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: ProfileKind,
    pub created_at: DateTime<Utc>,
    pub institution_ids: Vec<Uuid>,
    pub category_ids: Vec<Uuid>,
}

impl Profile {
    pub fn new(user_id: Uuid, name: String, kind: ProfileKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            kind,
            created_at: Utc::now(),
            institution_ids: Vec::new(),
            category_ids: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: String,
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
    #[sea_orm(has_many = "super::institutions::Entity")]
    Institutions,
    #[sea_orm(has_many = "super::categories::Entity")]
    Categories,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::institutions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institutions.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Profile> for ActiveModel {
    fn from(profile: &Profile) -> Self {
        Self {
            id: ActiveValue::Set(profile.id),
            user_id: ActiveValue::Set(profile.user_id),
            name: ActiveValue::Set(profile.name.clone()),
            kind: ActiveValue::Set(profile.kind.as_str().to_string()),
            created_at: ActiveValue::Set(profile.created_at),
        }
    }
}

impl TryFrom<Model> for Profile {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            kind: ProfileKind::try_from(model.kind.as_str())?,
            name: model.name,
            created_at: model.created_at,
            institution_ids: Vec::new(),
            category_ids: Vec::new(),
        })
    }
}
