//! Closed category vocabularies, one per transaction kind.

use super::transaction::TransactionKind;
use crate::errors::{PlannerError, Result};

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "Moradia",
    "Alimentação",
    "Transporte",
    "Lazer",
    "Saúde",
    "Outros",
];

pub const INCOME_CATEGORIES: &[&str] = &["Salário", "Freelance", "Outros"];

pub const INVESTMENT_CATEGORIES: &[&str] = &[
    "Ações",
    "Fundos Imobiliários",
    "Renda Fixa",
    "Cripto",
    "Outros",
];

/// Categories a transaction of `kind` may be filed under, in selector order.
pub fn categories_for(kind: TransactionKind) -> &'static [&'static str] {
    match kind {
        TransactionKind::Expense => EXPENSE_CATEGORIES,
        TransactionKind::Income => INCOME_CATEGORIES,
        TransactionKind::Investment => INVESTMENT_CATEGORIES,
    }
}

pub fn is_valid_category(kind: TransactionKind, category: &str) -> bool {
    categories_for(kind).contains(&category)
}

pub fn validate_category(kind: TransactionKind, category: &str) -> Result<()> {
    if category.trim().is_empty() {
        return Err(PlannerError::InvalidInput("category is required".into()));
    }
    if !is_valid_category(kind, category) {
        return Err(PlannerError::InvalidInput(format!(
            "`{category}` is not a valid {kind} category"
        )));
    }
    Ok(())
}
