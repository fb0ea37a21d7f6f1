//! Derived labels for transactions.

use serde::{Deserialize, Serialize};

use crate::{MoneyCents, TransactionKind};

/// Amounts strictly above this are `HighValue`.
const HIGH_VALUE_THRESHOLD: MoneyCents = MoneyCents::new(1_000_00);

const INVESTMENT_CATEGORIES: [&str; 2] = ["investment", "investimento"];
const SALARY_KEYWORDS: [&str; 3] = ["salary", "salário", "salario"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    HighValue,
    Investment,
    Income,
    RegularExpense,
    Standard,
}

impl Classification {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighValue => "high_value",
            Self::Investment => "investment",
            Self::Income => "income",
            Self::RegularExpense => "regular_expense",
            Self::Standard => "standard",
        }
    }
}

/// Rules are checked in order; the first match wins.
pub fn classify(
    kind: TransactionKind,
    amount_minor: i64,
    category_name: &str,
    description: &str,
) -> Classification {
    if MoneyCents::new(amount_minor) > HIGH_VALUE_THRESHOLD {
        return Classification::HighValue;
    }
    let category = category_name.trim().to_lowercase();
    if INVESTMENT_CATEGORIES.contains(&category.as_str()) {
        return Classification::Investment;
    }
    let description = description.to_lowercase();
    if SALARY_KEYWORDS.iter().any(|k| description.contains(k)) {
        return Classification::Income;
    }
    match kind {
        TransactionKind::Expense => Classification::RegularExpense,
        TransactionKind::Income => Classification::Standard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn high_value_wins_over_everything() {
        let c = classify(TransactionKind::Income, 1_000_01, "Investment", "salary");
        assert_eq!(c, Classification::HighValue);
    }

    #[test]
    fn threshold_is_exclusive() {
        let c = classify(TransactionKind::Expense, 1_000_00, "Food", "groceries");
        assert_eq!(c, Classification::RegularExpense);
    }

    #[test]
    fn investment_category_is_case_insensitive() {
        let c = classify(TransactionKind::Expense, 50_00, "investimento", "etf");
        assert_eq!(c, Classification::Investment);
    }

    #[test]
    fn salary_in_description_is_income() {
        let c = classify(TransactionKind::Income, 900_00, "Work", "Salário março");
        assert_eq!(c, Classification::Income);
    }

    #[test]
    fn plain_income_is_standard() {
        let c = classify(TransactionKind::Income, 10_00, "Gifts", "birthday");
        assert_eq!(c, Classification::Standard);
    }
}
