//! Domain engine for lexfin: users, profiles, institutions, categories,
//! transactions, law-office clients and cases.
//!
//! Every operation lives on [`Engine`] and takes the id of the calling user;
//! ownership and role checks happen inside the engine.

pub use cases::{Case, CaseStatus};
pub use categories::Category;
pub use classify::Classification;
pub use clients::Client;
pub use commands::{
    CaseCmd, ClientCmd, CreateUserCmd, ImportRecordCmd, InstallmentsCmd, InstitutionCmd,
    RegisterUserCmd, TransactionCmd, UpdateAccountCmd,
};
pub use error::EngineError;
pub use import_records::ImportRecord;
pub use institutions::Institution;
pub use money::{MAX_AMOUNT_MINOR, MoneyCents};
pub use ops::{
    CaseListFilter, CaseStats, CategorySummary, ClientListFilter, Engine, EngineBuilder,
    FeeTotals, FinancialSummary, ImportRecordListFilter, InstitutionListFilter,
    SummaryQuery, TransactionListFilter,
};
pub use password::{hash_password, verify_password};
pub use profiles::{Profile, ProfileKind};
pub use subcategories::Subcategory;
pub use transactions::{Installment, Transaction, TransactionKind};
pub use users::{User, UserRole};

mod cases;
mod categories;
mod classify;
mod clients;
mod commands;
mod error;
mod import_records;
mod institutions;
mod money;
mod ops;
mod password;
mod profiles;
mod subcategories;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
