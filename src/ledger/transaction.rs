use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::validate_category;
use crate::errors::{PlannerError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
    Investment,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 3] = [
        TransactionKind::Income,
        TransactionKind::Expense,
        TransactionKind::Investment,
    ];

    /// Contribution of `amount` to the balance. Investments are tracked
    /// separately and never move the balance.
    pub fn signed(self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
            TransactionKind::Investment => Decimal::ZERO,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
            TransactionKind::Investment => "investment",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            "investment" => Ok(TransactionKind::Investment),
            other => Err(PlannerError::InvalidInput(format!(
                "unknown transaction type `{other}`"
            ))),
        }
    }
}

/// A recorded ledger entry. Entries are never edited; they are deleted and
/// recorded again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installment_group_id: Option<Uuid>,
}

impl Transaction {
    /// Materializes a draft once the store has assigned an identifier.
    pub fn from_draft(id: Uuid, draft: TransactionDraft) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            kind: draft.kind,
            amount: draft.amount,
            description: draft.description,
            category: draft.category,
            date: draft.date,
            card_id: draft.card_id,
            installment_group_id: draft.installment_group_id,
        }
    }

    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }
}

/// A transaction that has not been persisted yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionDraft {
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub date: NaiveDate,
    pub card_id: Option<Uuid>,
    pub installment_group_id: Option<Uuid>,
}

impl TransactionDraft {
    pub fn new(
        user_id: impl Into<String>,
        kind: TransactionKind,
        amount: Decimal,
        category: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            amount,
            description: String::new(),
            category: category.into(),
            date,
            card_id: None,
            installment_group_id: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_card(mut self, card_id: Uuid) -> Self {
        self.card_id = Some(card_id);
        self
    }

    pub fn with_group(mut self, group_id: Uuid) -> Self {
        self.installment_group_id = Some(group_id);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(PlannerError::InvalidInput("user id is required".into()));
        }
        validate_amount(self.amount)?;
        validate_category(self.kind, &self.category)?;
        if self.card_id.is_some() && self.kind != TransactionKind::Expense {
            return Err(PlannerError::InvalidInput(
                "only expenses can be charged to a card".into(),
            ));
        }
        Ok(())
    }
}

pub fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(PlannerError::InvalidInput(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> TransactionDraft {
        TransactionDraft::new(
            "user-1",
            TransactionKind::Expense,
            dec!(42.50),
            "Moradia",
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        )
    }

    #[test]
    fn signs_follow_kind() {
        assert_eq!(TransactionKind::Income.signed(dec!(10)), dec!(10));
        assert_eq!(TransactionKind::Expense.signed(dec!(10)), dec!(-10));
        assert_eq!(TransactionKind::Investment.signed(dec!(10)), Decimal::ZERO);
    }

    #[test]
    fn validate_rejects_non_positive_amounts() {
        let mut zero = draft();
        zero.amount = Decimal::ZERO;
        assert!(zero.validate().is_err());
        let mut negative = draft();
        negative.amount = dec!(-1);
        assert!(negative.validate().is_err());
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn validate_rejects_card_on_income() {
        let mut txn = draft().with_card(Uuid::new_v4());
        assert!(txn.validate().is_ok());
        txn.kind = TransactionKind::Income;
        txn.category = "Salário".into();
        assert!(txn.validate().is_err());
    }

    #[test]
    fn serializes_kind_under_type_key() {
        let txn = Transaction::from_draft(Uuid::new_v4(), draft());
        let json = serde_json::to_value(&txn).unwrap();
        assert_eq!(json["type"], "expense");
        assert!(json.get("card_id").is_none());
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, txn);
    }

    #[test]
    fn parses_kind_case_insensitively() {
        assert_eq!("Income".parse::<TransactionKind>().unwrap(), TransactionKind::Income);
        assert!("transfer".parse::<TransactionKind>().is_err());
    }
}
