use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Login {
        pub email: String,
        pub password: String,
    }

    /// Issued on a successful login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Token {
        pub token: String,
        /// Always `Bearer`.
        pub token_type: String,
        /// Seconds until the token expires.
        pub expires_in: u64,
        pub user: super::user::UserView,
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum UserRole {
        Common,
        Admin,
        Lawyer,
    }

    /// Public sign up.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub name: String,
        pub email: String,
        pub password: String,
        pub password_confirmation: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub name: String,
        pub email: String,
        pub role: UserRole,
        pub created_at: DateTime<Utc>,
    }

    /// Changes to the caller's own account. `current_password` is required.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccountUpdate {
        pub current_password: String,
        pub name: Option<String>,
        pub email: Option<String>,
        pub new_password: Option<String>,
        pub new_password_confirmation: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdminUserNew {
        pub name: String,
        pub email: String,
        pub password: String,
        pub role: Option<UserRole>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AdminUserUpdate {
        pub name: Option<String>,
        pub email: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdminCheck {
        pub is_admin: bool,
    }
}

pub mod profile {
    use super::*;

    /// `PF` is a natural person, `PJ` a company.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum ProfileKind {
        Pf,
        Pj,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileNew {
        pub name: String,
        pub kind: ProfileKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfileView {
        pub id: Uuid,
        pub name: String,
        pub kind: ProfileKind,
        pub created_at: DateTime<Utc>,
        pub institution_ids: Vec<Uuid>,
        pub category_ids: Vec<Uuid>,
    }
}

pub mod institution {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstitutionNew {
        pub profile_id: Uuid,
        pub name: String,
        /// Free-form kind such as `checking`, `savings` or `credit_card`.
        pub kind: String,
        #[serde(default)]
        pub opening_balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstitutionUpdate {
        pub name: String,
        pub kind: String,
        #[serde(default)]
        pub opening_balance_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct InstitutionList {
        pub profile_id: Option<Uuid>,
        pub kind: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BalancesRecompute {
        pub profile_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstitutionView {
        pub id: Uuid,
        pub profile_id: Uuid,
        pub name: String,
        pub kind: String,
        pub opening_balance_minor: i64,
        pub balance_minor: i64,
        pub created_at: DateTime<Utc>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub profile_id: Uuid,
        pub name: String,
        pub kind: TransactionKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: String,
        pub kind: TransactionKind,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryList {
        pub profile_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub profile_id: Uuid,
        pub name: String,
        pub kind: TransactionKind,
        /// System categories are managed by the server and read-only.
        pub is_system: bool,
        pub subcategories: Vec<SubcategoryView>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubcategoryNew {
        pub category_id: Uuid,
        pub name: String,
    }

    /// Setting `category_id` moves the subcategory under another category.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubcategoryUpdate {
        pub name: String,
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SubcategoryList {
        pub category_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SubcategoryView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub name: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Classification {
        HighValue,
        Investment,
        Income,
        RegularExpense,
        Standard,
    }

    /// Create or replace a transaction.
    ///
    /// With `destination_profile_id` set the request books a transfer between
    /// two profiles and `category_id` is ignored.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub profile_id: Option<Uuid>,
        pub institution_id: Uuid,
        pub category_id: Option<Uuid>,
        pub subcategory_id: Option<Uuid>,
        pub occurred_on: NaiveDate,
        pub description: String,
        /// Must be > 0. The kind defines the sign.
        pub amount_minor: i64,
        pub kind: TransactionKind,
        pub destination_profile_id: Option<Uuid>,
        pub destination_institution_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstallmentsNew {
        #[serde(flatten)]
        pub transaction: TransactionNew,
        /// Between 2 and 120.
        pub installment_count: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstallmentsDeleted {
        pub removed: u64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionList {
        pub profile_id: Option<Uuid>,
        pub kind: Option<TransactionKind>,
        pub category_id: Option<Uuid>,
        pub institution_id: Option<Uuid>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct InstallmentView {
        pub group: Uuid,
        pub number: u32,
        pub count: u32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
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
        pub installment: Option<InstallmentView>,
        pub classification: Classification,
        pub created_at: DateTime<Utc>,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryGet {
        pub profile_id: Option<Uuid>,
        pub from: NaiveDate,
        pub to: NaiveDate,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub category_id: Uuid,
        pub name: String,
        pub kind: TransactionKind,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        pub total_income_minor: i64,
        pub total_expense_minor: i64,
        pub balance_minor: i64,
        pub by_category: Vec<CategoryTotal>,
    }
}

pub mod client {
    use super::*;

    /// Body for both creating and updating a client.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ClientNew {
        pub name: String,
        /// CPF or CNPJ, 11 to 18 characters with punctuation.
        pub tax_id: String,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub postal_code: Option<String>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ClientList {
        pub city: Option<String>,
        pub state: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientView {
        pub id: Uuid,
        pub name: String,
        pub tax_id: String,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
        pub city: Option<String>,
        pub state: Option<String>,
        pub postal_code: Option<String>,
        pub notes: Option<String>,
        pub total_cases: u64,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClientCount {
        pub count: u64,
    }
}

pub mod case {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum CaseStatus {
        Active,
        Suspended,
        Archived,
        Finished,
        Cancelled,
    }

    /// Body for both creating and updating a case.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CaseNew {
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

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CaseList {
        pub status: Option<CaseStatus>,
        pub start_from: Option<NaiveDate>,
        pub start_to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeePayment {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CaseView {
        pub id: Uuid,
        pub client_id: Uuid,
        pub client_name: String,
        pub client_tax_id: String,
        pub lawyer_name: String,
        pub process_number: String,
        pub description: String,
        pub status: CaseStatus,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
        pub fee_minor: Option<i64>,
        pub fees_paid_minor: i64,
        pub remaining_fee_minor: i64,
        pub fully_paid: bool,
        pub notes: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeeTotals {
        pub total_minor: i64,
        pub paid_minor: i64,
        pub remaining_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StatusCount {
        pub status: CaseStatus,
        pub count: u64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CaseStats {
        pub total: u64,
        pub by_status: Vec<StatusCount>,
    }
}

pub mod import_record {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportRecordNew {
        pub extracted_on: NaiveDate,
        pub bank: String,
        pub period: String,
        pub file_name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ImportRecordList {
        pub bank: Option<String>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ImportRecordView {
        pub id: Uuid,
        pub extracted_on: NaiveDate,
        pub bank: String,
        pub period: String,
        pub file_name: String,
        pub created_at: DateTime<Utc>,
    }
}

/// Free-text search (`?q=`).
#[derive(Debug, Serialize, Deserialize)]
pub struct Search {
    pub q: String,
}
