//! Users and their roles.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

/// What a user is allowed to do.
///
/// - `common`: personal finance only.
/// - `lawyer`: personal finance plus clients and cases.
/// - `admin`: everything, including user management.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    Common,
    Admin,
    Lawyer,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Admin => "admin",
            Self::Lawyer => "lawyer",
        }
    }

    /// Whether the role grants access to clients and cases.
    pub fn can_practice_law(self) -> bool {
        matches!(self, Self::Lawyer | Self::Admin)
    }
}

impl TryFrom<&str> for UserRole {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "common" => Ok(Self::Common),
            "admin" => Ok(Self::Admin),
            "lawyer" => Ok(Self::Lawyer),
            other => Err(EngineError::InvalidInput(format!("invalid role: {other}"))),
        }
    }
}

/// A registered user. The password hash never leaves the entity model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::profiles::Entity")]
    Profiles,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profiles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            role: UserRole::try_from(model.role.as_str())?,
            name: model.name,
            email: model.email,
            created_at: model.created_at,
        })
    }
}
