//! Command structs for engine operations.
//!
//! These types group parameters for write operations, keeping call sites
//! readable and avoiding long argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{CaseStatus, TransactionKind, UserRole};

/// Self-service registration. The role is always `common`.
#[derive(Clone, Debug)]
pub struct RegisterUserCmd {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Administrative user creation with an explicit role.
#[derive(Clone, Debug)]
pub struct CreateUserCmd {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Changes to the caller's own account. `current_password` is always
/// required; every other field is optional.
#[derive(Clone, Debug, Default)]
pub struct UpdateAccountCmd {
    pub current_password: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub new_password: Option<String>,
    pub new_password_confirmation: Option<String>,
}

#[derive(Clone, Debug)]
pub struct InstitutionCmd {
    pub name: String,
    pub kind: String,
    pub opening_balance_minor: i64,
}

/// Create or replace an income/expense transaction.
///
/// Setting `destination_profile_id` turns the transaction into a profile
/// transfer.
#[derive(Clone, Debug)]
pub struct TransactionCmd {
    pub profile_id: Option<Uuid>,
    pub institution_id: Uuid,
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub occurred_on: NaiveDate,
    pub description: String,
    pub amount_minor: i64,
    pub kind: TransactionKind,
    pub destination_profile_id: Option<Uuid>,
    pub destination_institution_id: Option<Uuid>,
}

impl TransactionCmd {
    #[must_use]
    pub fn new(
        kind: TransactionKind,
        institution_id: Uuid,
        amount_minor: i64,
        occurred_on: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        Self {
            profile_id: None,
            institution_id,
            category_id: None,
            subcategory_id: None,
            occurred_on,
            description: description.into(),
            amount_minor,
            kind,
            destination_profile_id: None,
            destination_institution_id: None,
        }
    }

    #[must_use]
    pub fn profile(mut self, profile_id: Uuid) -> Self {
        self.profile_id = Some(profile_id);
        self
    }

    #[must_use]
    pub fn category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    #[must_use]
    pub fn subcategory(mut self, subcategory_id: Uuid) -> Self {
        self.subcategory_id = Some(subcategory_id);
        self
    }

    /// Send the amount to another profile of the same user.
    #[must_use]
    pub fn transfer_to(mut self, profile_id: Uuid, institution_id: Option<Uuid>) -> Self {
        self.destination_profile_id = Some(profile_id);
        self.destination_institution_id = institution_id;
        self
    }

    pub(crate) fn is_transfer(&self) -> bool {
        self.destination_profile_id.is_some()
    }
}

/// Split `transaction.amount_minor` over `installment_count` monthly rows.
#[derive(Clone, Debug)]
pub struct InstallmentsCmd {
    pub transaction: TransactionCmd,
    pub installment_count: u32,
}

#[derive(Clone, Debug, Default)]
pub struct ClientCmd {
    pub name: String,
    pub tax_id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct CaseCmd {
    pub client_id: Uuid,
    pub process_number: String,
    pub description: String,
    pub status: Option<CaseStatus>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub fee_minor: Option<i64>,
    pub fees_paid_minor: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ImportRecordCmd {
    pub extracted_on: NaiveDate,
    pub bank: String,
    pub period: String,
    pub file_name: String,
}
