use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine};

mod access;
mod balances;
mod cases;
mod categories;
mod clients;
mod import_records;
mod institutions;
mod profiles;
mod subcategories;
mod summary;
mod transactions;
mod users;

pub use cases::{CaseListFilter, CaseStats, FeeTotals};
pub use clients::ClientListFilter;
pub use import_records::ImportRecordListFilter;
pub use institutions::InstitutionListFilter;
pub use summary::{CategorySummary, FinancialSummary, SummaryQuery};
pub use transactions::TransactionListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Start configuring an engine.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Names are unique per parent regardless of case, Unicode letters included.
fn name_taken(existing: &[String], name: &str) -> bool {
    let wanted = name.to_lowercase();
    existing.iter().any(|other| other.to_lowercase() == wanted)
}

fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Configures an [`Engine`]. A database connection is mandatory.
#[derive(Default)]
pub struct EngineBuilder {
    database: Option<DatabaseConnection>,
}

impl EngineBuilder {
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = Some(db);
        self
    }

    /// Check the connection and construct the engine.
    pub async fn build(self) -> ResultEngine<Engine> {
        let database = self.database.ok_or_else(|| {
            EngineError::InvalidInput("engine requires a database connection".to_string())
        })?;
        database.ping().await?;
        Ok(Engine { database })
    }
}
