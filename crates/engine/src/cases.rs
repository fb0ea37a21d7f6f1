//! Legal cases and their fees.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    #[default]
    Active,
    Suspended,
    Archived,
    Finished,
    Cancelled,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 5] = [
        Self::Active,
        Self::Suspended,
        Self::Archived,
        Self::Finished,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Archived => "archived",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }
}

impl TryFrom<&str> for CaseStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "archived" => Ok(Self::Archived),
            "finished" => Ok(Self::Finished),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(EngineError::InvalidInput(format!(
                "invalid case status: {other}"
            ))),
        }
    }
}

/// A case with the client and lawyer details a caller usually needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub lawyer_name: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub client_tax_id: String,
    pub process_number: String,
    pub description: String,
    pub status: CaseStatus,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub fee_minor: Option<i64>,
    pub fees_paid_minor: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Case {
    /// Fee still to be collected; zero when no fee was agreed.
    pub fn remaining_fee_minor(&self) -> i64 {
        self.fee_minor
            .map(|fee| (fee - self.fees_paid_minor).max(0))
            .unwrap_or(0)
    }

    /// `true` only when a fee exists and it has been fully collected.
    pub fn fully_paid(&self) -> bool {
        self.fee_minor
            .is_some_and(|fee| self.fees_paid_minor >= fee)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub lawyer_id: Uuid,
    pub client_id: Uuid,
    pub process_number: String,
    pub description: String,
    pub status: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub fee_minor: Option<i64>,
    pub fees_paid_minor: i64,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::LawyerId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Lawyer,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lawyer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Case> for ActiveModel {
    fn from(case: &Case) -> Self {
        Self {
            id: ActiveValue::Set(case.id),
            lawyer_id: ActiveValue::Set(case.lawyer_id),
            client_id: ActiveValue::Set(case.client_id),
            process_number: ActiveValue::Set(case.process_number.clone()),
            description: ActiveValue::Set(case.description.clone()),
            status: ActiveValue::Set(case.status.as_str().to_string()),
            start_date: ActiveValue::Set(case.start_date),
            end_date: ActiveValue::Set(case.end_date),
            fee_minor: ActiveValue::Set(case.fee_minor),
            fees_paid_minor: ActiveValue::Set(case.fees_paid_minor),
            notes: ActiveValue::Set(case.notes.clone()),
            created_at: ActiveValue::Set(case.created_at),
            updated_at: ActiveValue::Set(case.updated_at),
        }
    }
}

/// Converts a stored row plus its client and the lawyer name.
impl TryFrom<(Model, &super::clients::Model, &str)> for Case {
    type Error = EngineError;

    fn try_from(
        (model, client, lawyer_name): (Model, &super::clients::Model, &str),
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            lawyer_id: model.lawyer_id,
            lawyer_name: lawyer_name.to_string(),
            client_id: model.client_id,
            client_name: client.name.clone(),
            client_tax_id: client.tax_id.clone(),
            process_number: model.process_number,
            description: model.description,
            status: CaseStatus::try_from(model.status.as_str())?,
            start_date: model.start_date,
            end_date: model.end_date,
            fee_minor: model.fee_minor,
            fees_paid_minor: model.fees_paid_minor,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case_with_fee(fee_minor: Option<i64>, fees_paid_minor: i64) -> Case {
        Case {
            id: Uuid::new_v4(),
            lawyer_id: Uuid::new_v4(),
            lawyer_name: "Ana".to_string(),
            client_id: Uuid::new_v4(),
            client_name: "Bruno".to_string(),
            client_tax_id: "123.456.789-00".to_string(),
            process_number: "0001234-56.2024.8.26.0100".to_string(),
            description: "Labor claim against employer".to_string(),
            status: CaseStatus::Active,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            end_date: None,
            fee_minor,
            fees_paid_minor,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn remaining_is_zero_without_fee() {
        let case = case_with_fee(None, 0);
        assert_eq!(case.remaining_fee_minor(), 0);
        assert!(!case.fully_paid());
    }

    #[test]
    fn remaining_tracks_payments() {
        let case = case_with_fee(Some(5_000_00), 1_500_00);
        assert_eq!(case.remaining_fee_minor(), 3_500_00);
        assert!(!case.fully_paid());
    }

    #[test]
    fn overpaid_case_has_no_remaining_fee() {
        let case = case_with_fee(Some(1_000_00), 1_200_00);
        assert_eq!(case.remaining_fee_minor(), 0);
        assert!(case.fully_paid());
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in CaseStatus::ALL {
            assert_eq!(CaseStatus::try_from(status.as_str()).unwrap(), status);
        }
        assert!(CaseStatus::try_from("closed").is_err());
    }
}
