use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use sea_orm::{QueryFilter, QuerySelect, TransactionTrait, prelude::*};

use crate::{
    MoneyCents, ResultEngine, TransactionKind, categories, transactions, util::ensure_date_range,
};

use super::{Engine, with_tx};

/// Period (inclusive on both ends) and optional profile to summarize.
#[derive(Clone, Debug)]
pub struct SummaryQuery {
    pub profile_id: Option<Uuid>,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category_id: Uuid,
    pub name: String,
    pub kind: TransactionKind,
    pub total: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub total_income: i64,
    pub total_expense: i64,
    pub balance: i64,
    pub by_category: Vec<CategorySummary>,
}

impl Engine {
    /// Income, expense and per-category totals for a period.
    pub async fn financial_summary(
        &self,
        query: &SummaryQuery,
        user_id: Uuid,
    ) -> ResultEngine<FinancialSummary> {
        ensure_date_range(Some(query.from), Some(query.to))?;
        with_tx!(self, |db_tx| {
            let mut rows = transactions::Entity::find()
                .filter(transactions::Column::UserId.eq(user_id))
                .filter(transactions::Column::OccurredOn.gte(query.from))
                .filter(transactions::Column::OccurredOn.lte(query.to));
            if let Some(profile_id) = query.profile_id {
                self.require_profile(&db_tx, profile_id, user_id).await?;
                rows = rows.filter(transactions::Column::ProfileId.eq(profile_id));
            }
            let rows: Vec<(Uuid, String, i64)> = rows
                .select_only()
                .column(transactions::Column::CategoryId)
                .column(transactions::Column::Kind)
                .column(transactions::Column::AmountMinor)
                .into_tuple()
                .all(&db_tx)
                .await?;

            let mut total_income = MoneyCents::default();
            let mut total_expense = MoneyCents::default();
            let mut per_category: HashMap<Uuid, MoneyCents> = HashMap::new();
            for (category_id, kind, amount) in rows {
                let amount = MoneyCents::new(amount);
                match TransactionKind::try_from(kind.as_str())? {
                    TransactionKind::Income => total_income = total_income.checked_add(amount)?,
                    TransactionKind::Expense => total_expense = total_expense.checked_add(amount)?,
                }
                let total = per_category.entry(category_id).or_default();
                *total = total.checked_add(amount)?;
            }

            let mut by_category = Vec::with_capacity(per_category.len());
            for category in categories::Entity::find()
                .filter(categories::Column::Id.is_in(per_category.keys().copied()))
                .all(&db_tx)
                .await?
            {
                let total = per_category
                    .get(&category.id)
                    .copied()
                    .unwrap_or_default()
                    .cents();
                if total > 0 {
                    by_category.push(CategorySummary {
                        kind: TransactionKind::try_from(category.kind.as_str())?,
                        category_id: category.id,
                        name: category.name,
                        total,
                    });
                }
            }
            by_category.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

            Ok(FinancialSummary {
                total_income: total_income.cents(),
                total_expense: total_expense.cents(),
                balance: total_income.checked_sub(total_expense)?.cents(),
                by_category,
            })
        })
    }
}
