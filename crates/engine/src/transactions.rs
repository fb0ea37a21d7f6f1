//! Transaction primitives.
//!
//! A `Transaction` books an income or an expense against one institution.
//! Two special shapes share the same table:
//!
//! - profile transfers: two rows (an expense in the source profile and an
//!   income in the destination profile) pointing at each other through
//!   `related_transaction_id`;
//! - installments: `installment_count` rows sharing an `installment_group`.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    classify::{Classification, classify},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Sign applied to the institution balance: income adds, expense subtracts.
    pub fn sign(self) -> i64 {
        match self {
            Self::Income => 1,
            Self::Expense => -1,
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidInput(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// Position of a row inside an installment plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub group: Uuid,
    pub number: u32,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub institution_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub subcategory_id: Option<Uuid>,
    pub occurred_on: NaiveDate,
    pub description: String,
    pub amount_minor: i64,
    pub kind: TransactionKind,
    pub is_profile_transfer: bool,
    pub destination_profile_id: Option<Uuid>,
    pub related_transaction_id: Option<Uuid>,
    pub installment: Option<Installment>,
    pub classification: Classification,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a plain income/expense row.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: Uuid,
        profile_id: Uuid,
        institution_id: Uuid,
        category: (Uuid, &str),
        subcategory_id: Option<Uuid>,
        occurred_on: NaiveDate,
        description: String,
        amount_minor: i64,
        kind: TransactionKind,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        let (category_id, category_name) = category;
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            profile_id,
            institution_id,
            category_id,
            category_name: category_name.to_string(),
            subcategory_id,
            occurred_on,
            classification: classify(kind, amount_minor, category_name, &description),
            description,
            amount_minor,
            kind,
            is_profile_transfer: false,
            destination_profile_id: None,
            related_transaction_id: None,
            installment: None,
            created_at: Utc::now(),
        })
    }

    /// Signed effect of this row on its institution balance.
    pub fn balance_delta(&self) -> i64 {
        self.kind.sign() * self.amount_minor
    }

    pub(crate) fn refresh_classification(&mut self) {
        self.classification = classify(
            self.kind,
            self.amount_minor,
            &self.category_name,
            &self.description,
        );
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub institution_id: Uuid,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub occurred_on: Date,
    pub description: String,
    pub amount_minor: i64,
    pub kind: String,
    pub is_profile_transfer: bool,
    pub destination_profile_id: Option<Uuid>,
    pub related_transaction_id: Option<Uuid>,
    pub installment_group: Option<Uuid>,
    pub installment_number: Option<i32>,
    pub installment_count: Option<i32>,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub(crate) fn balance_delta(&self) -> ResultEngine<i64> {
        Ok(TransactionKind::try_from(self.kind.as_str())?.sign() * self.amount_minor)
    }
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
    #[sea_orm(
        belongs_to = "super::institutions::Entity",
        from = "Column::InstitutionId",
        to = "super::institutions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Institution,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Category,
}

impl Related<super::profiles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl Related<super::institutions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Institution.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::Set(tx.user_id),
            profile_id: ActiveValue::Set(tx.profile_id),
            institution_id: ActiveValue::Set(tx.institution_id),
            category_id: ActiveValue::Set(tx.category_id),
            subcategory_id: ActiveValue::Set(tx.subcategory_id),
            occurred_on: ActiveValue::Set(tx.occurred_on),
            description: ActiveValue::Set(tx.description.clone()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            is_profile_transfer: ActiveValue::Set(tx.is_profile_transfer),
            destination_profile_id: ActiveValue::Set(tx.destination_profile_id),
            related_transaction_id: ActiveValue::Set(tx.related_transaction_id),
            installment_group: ActiveValue::Set(tx.installment.map(|i| i.group)),
            installment_number: ActiveValue::Set(tx.installment.map(|i| i.number as i32)),
            installment_count: ActiveValue::Set(tx.installment.map(|i| i.count as i32)),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

/// Converts a stored row plus the name of its category.
impl TryFrom<(Model, String)> for Transaction {
    type Error = EngineError;

    fn try_from((model, category_name): (Model, String)) -> Result<Self, Self::Error> {
        let kind = TransactionKind::try_from(model.kind.as_str())?;
        let installment = match (
            model.installment_group,
            model.installment_number,
            model.installment_count,
        ) {
            (Some(group), Some(number), Some(count)) => Some(Installment {
                group,
                number: u32::try_from(number)
                    .map_err(|_| EngineError::InvalidInput("invalid installment".to_string()))?,
                count: u32::try_from(count)
                    .map_err(|_| EngineError::InvalidInput("invalid installment".to_string()))?,
            }),
            _ => None,
        };
        Ok(Self {
            classification: classify(kind, model.amount_minor, &category_name, &model.description),
            id: model.id,
            user_id: model.user_id,
            profile_id: model.profile_id,
            institution_id: model.institution_id,
            category_id: model.category_id,
            category_name,
            subcategory_id: model.subcategory_id,
            occurred_on: model.occurred_on,
            description: model.description,
            amount_minor: model.amount_minor,
            kind,
            is_profile_transfer: model.is_profile_transfer,
            destination_profile_id: model.destination_profile_id,
            related_transaction_id: model.related_transaction_id,
            installment,
            created_at: model.created_at,
        })
    }
}
