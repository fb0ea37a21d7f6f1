//! Mapping between engine types and their wire representation.

use api_types::{
    TransactionKind,
    case::{CaseStats, CaseStatus, CaseView, FeeTotals, StatusCount},
    category::{CategoryView, SubcategoryView},
    client::ClientView,
    import_record::ImportRecordView,
    institution::InstitutionView,
    profile::{ProfileKind, ProfileView},
    summary::{CategoryTotal, Summary},
    transaction::{Classification, InstallmentView, TransactionView},
    user::{UserRole, UserView},
};

pub(crate) fn kind_to_engine(kind: TransactionKind) -> engine::TransactionKind {
    match kind {
        TransactionKind::Income => engine::TransactionKind::Income,
        TransactionKind::Expense => engine::TransactionKind::Expense,
    }
}

pub(crate) fn kind_from_engine(kind: engine::TransactionKind) -> TransactionKind {
    match kind {
        engine::TransactionKind::Income => TransactionKind::Income,
        engine::TransactionKind::Expense => TransactionKind::Expense,
    }
}

pub(crate) fn role_to_engine(role: UserRole) -> engine::UserRole {
    match role {
        UserRole::Common => engine::UserRole::Common,
        UserRole::Admin => engine::UserRole::Admin,
        UserRole::Lawyer => engine::UserRole::Lawyer,
    }
}

fn role_from_engine(role: engine::UserRole) -> UserRole {
    match role {
        engine::UserRole::Common => UserRole::Common,
        engine::UserRole::Admin => UserRole::Admin,
        engine::UserRole::Lawyer => UserRole::Lawyer,
    }
}

pub(crate) fn profile_kind_to_engine(kind: ProfileKind) -> engine::ProfileKind {
    match kind {
        ProfileKind::Pf => engine::ProfileKind::Pf,
        ProfileKind::Pj => engine::ProfileKind::Pj,
    }
}

pub(crate) fn status_to_engine(status: CaseStatus) -> engine::CaseStatus {
    match status {
        CaseStatus::Active => engine::CaseStatus::Active,
        CaseStatus::Suspended => engine::CaseStatus::Suspended,
        CaseStatus::Archived => engine::CaseStatus::Archived,
        CaseStatus::Finished => engine::CaseStatus::Finished,
        CaseStatus::Cancelled => engine::CaseStatus::Cancelled,
    }
}

fn status_from_engine(status: engine::CaseStatus) -> CaseStatus {
    match status {
        engine::CaseStatus::Active => CaseStatus::Active,
        engine::CaseStatus::Suspended => CaseStatus::Suspended,
        engine::CaseStatus::Archived => CaseStatus::Archived,
        engine::CaseStatus::Finished => CaseStatus::Finished,
        engine::CaseStatus::Cancelled => CaseStatus::Cancelled,
    }
}

pub(crate) fn user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        role: role_from_engine(user.role),
        created_at: user.created_at,
    }
}

pub(crate) fn profile(profile: engine::Profile) -> ProfileView {
    ProfileView {
        id: profile.id,
        name: profile.name,
        kind: match profile.kind {
            engine::ProfileKind::Pf => ProfileKind::Pf,
            engine::ProfileKind::Pj => ProfileKind::Pj,
        },
        created_at: profile.created_at,
        institution_ids: profile.institution_ids,
        category_ids: profile.category_ids,
    }
}

pub(crate) fn institution(institution: engine::Institution) -> InstitutionView {
    InstitutionView {
        id: institution.id,
        profile_id: institution.profile_id,
        name: institution.name,
        kind: institution.kind,
        opening_balance_minor: institution.opening_balance_minor,
        balance_minor: institution.balance_minor,
        created_at: institution.created_at,
    }
}

pub(crate) fn subcategory(subcategory: engine::Subcategory) -> SubcategoryView {
    SubcategoryView {
        id: subcategory.id,
        category_id: subcategory.category_id,
        name: subcategory.name,
        created_at: subcategory.created_at,
    }
}

pub(crate) fn category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        profile_id: category.profile_id,
        name: category.name,
        kind: kind_from_engine(category.kind),
        is_system: category.is_system,
        subcategories: category.subcategories.into_iter().map(subcategory).collect(),
        created_at: category.created_at,
    }
}

pub(crate) fn transaction(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        profile_id: tx.profile_id,
        institution_id: tx.institution_id,
        category_id: tx.category_id,
        category_name: tx.category_name,
        subcategory_id: tx.subcategory_id,
        occurred_on: tx.occurred_on,
        description: tx.description,
        amount_minor: tx.amount_minor,
        kind: kind_from_engine(tx.kind),
        is_profile_transfer: tx.is_profile_transfer,
        destination_profile_id: tx.destination_profile_id,
        related_transaction_id: tx.related_transaction_id,
        installment: tx.installment.map(|i| InstallmentView {
            group: i.group,
            number: i.number,
            count: i.count,
        }),
        classification: match tx.classification {
            engine::Classification::HighValue => Classification::HighValue,
            engine::Classification::Investment => Classification::Investment,
            engine::Classification::Income => Classification::Income,
            engine::Classification::RegularExpense => Classification::RegularExpense,
            engine::Classification::Standard => Classification::Standard,
        },
        created_at: tx.created_at,
    }
}

pub(crate) fn summary(summary: engine::FinancialSummary) -> Summary {
    Summary {
        total_income_minor: summary.total_income,
        total_expense_minor: summary.total_expense,
        balance_minor: summary.balance,
        by_category: summary
            .by_category
            .into_iter()
            .map(|c| CategoryTotal {
                category_id: c.category_id,
                name: c.name,
                kind: kind_from_engine(c.kind),
                total_minor: c.total,
            })
            .collect(),
    }
}

pub(crate) fn client(client: engine::Client) -> ClientView {
    ClientView {
        id: client.id,
        name: client.name,
        tax_id: client.tax_id,
        phone: client.phone,
        email: client.email,
        address: client.address,
        city: client.city,
        state: client.state,
        postal_code: client.postal_code,
        notes: client.notes,
        total_cases: client.total_cases,
        created_at: client.created_at,
        updated_at: client.updated_at,
    }
}

pub(crate) fn case(case: engine::Case) -> CaseView {
    CaseView {
        remaining_fee_minor: case.remaining_fee_minor(),
        fully_paid: case.fully_paid(),
        id: case.id,
        client_id: case.client_id,
        client_name: case.client_name,
        client_tax_id: case.client_tax_id,
        lawyer_name: case.lawyer_name,
        process_number: case.process_number,
        description: case.description,
        status: status_from_engine(case.status),
        start_date: case.start_date,
        end_date: case.end_date,
        fee_minor: case.fee_minor,
        fees_paid_minor: case.fees_paid_minor,
        notes: case.notes,
        created_at: case.created_at,
        updated_at: case.updated_at,
    }
}

pub(crate) fn fee_totals(totals: engine::FeeTotals) -> FeeTotals {
    FeeTotals {
        total_minor: totals.total,
        paid_minor: totals.paid,
        remaining_minor: totals.remaining,
    }
}

pub(crate) fn case_stats(stats: engine::CaseStats) -> CaseStats {
    CaseStats {
        total: stats.total,
        by_status: stats
            .by_status
            .into_iter()
            .map(|(status, count)| StatusCount {
                status: status_from_engine(status),
                count,
            })
            .collect(),
    }
}

pub(crate) fn import_record(record: engine::ImportRecord) -> ImportRecordView {
    ImportRecordView {
        id: record.id,
        extracted_on: record.extracted_on,
        bank: record.bank,
        period: record.period,
        file_name: record.file_name,
        created_at: record.created_at,
    }
}
