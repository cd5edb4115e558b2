//! Expansion of one purchase or loan into its dated installments.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::billing::BillingCycle;
use super::calendar::shift_month;
use super::card::Card;
use super::transaction::{validate_amount, TransactionDraft, TransactionKind};
use crate::errors::{PlannerError, Result};

/// Upper bound on installments per plan.
pub const MAX_INSTALLMENTS: u32 = 420;

/// How installment dates are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Plain monthly cadence starting on the start date.
    Loan,
    /// Each installment falls on the due date of the statement that bills it.
    CreditCard { card_id: Uuid, cycle: BillingCycle },
}

/// A single user action that produces several ledger entries.
///
/// `amount` is the value of each installment, not the purchase total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallmentPlan {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub category: String,
    pub start_date: NaiveDate,
    pub installments: u32,
    pub method: PaymentMethod,
}

impl InstallmentPlan {
    /// Builds a loan-style plan for an expense.
    pub fn new(
        amount: Decimal,
        category: impl Into<String>,
        start_date: NaiveDate,
        installments: u32,
    ) -> Self {
        Self {
            kind: TransactionKind::Expense,
            amount,
            description: String::new(),
            category: category.into(),
            start_date,
            installments,
            method: PaymentMethod::Loan,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Bills the plan to `card`, dating installments by its statement cycle.
    pub fn on_card(mut self, card: &Card) -> Result<Self> {
        self.method = PaymentMethod::CreditCard {
            card_id: card.id,
            cycle: card.billing_cycle()?,
        };
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        validate_amount(self.amount)?;
        if self.installments == 0 {
            return Err(PlannerError::InvalidInput(
                "at least one installment is required".into(),
            ));
        }
        if self.installments > MAX_INSTALLMENTS {
            return Err(PlannerError::InvalidInput(format!(
                "at most {MAX_INSTALLMENTS} installments are supported"
            )));
        }
        if matches!(self.method, PaymentMethod::CreditCard { .. })
            && self.kind != TransactionKind::Expense
        {
            return Err(PlannerError::InvalidInput(
                "only expenses can be charged to a card".into(),
            ));
        }
        Ok(())
    }

    /// Date of the `index`-th (1-based) installment.
    pub fn installment_date(&self, index: u32) -> Result<NaiveDate> {
        if index == 0 {
            return Err(PlannerError::InvalidInput(
                "installment index starts at 1".into(),
            ));
        }
        match self.method {
            PaymentMethod::Loan => {
                let months = i32::try_from(index - 1).map_err(|_| {
                    PlannerError::InvalidInput(format!("installment index {index} is out of range"))
                })?;
                shift_month(self.start_date, months)
            }
            PaymentMethod::CreditCard { cycle, .. } => cycle.due_date(self.start_date, index),
        }
    }

    /// Expands the plan under a freshly generated group identifier.
    pub fn expand(&self, user_id: &str) -> Result<Vec<TransactionDraft>> {
        self.expand_with_group(user_id, Uuid::new_v4())
    }

    /// Expands the plan into one draft per installment, ordered by installment.
    pub fn expand_with_group(&self, user_id: &str, group_id: Uuid) -> Result<Vec<TransactionDraft>> {
        self.validate()?;
        let total = self.installments;
        let mut drafts = Vec::with_capacity(total as usize);
        for index in 1..=total {
            let date = self.installment_date(index)?;
            let mut draft = TransactionDraft::new(
                user_id,
                self.kind,
                self.amount,
                self.category.clone(),
                date,
            )
            .with_description(installment_label(&self.description, index, total))
            .with_group(group_id);
            if let PaymentMethod::CreditCard { card_id, .. } = self.method {
                draft = draft.with_card(card_id);
            }
            draft.validate()?;
            drafts.push(draft);
        }
        Ok(drafts)
    }
}

fn installment_label(description: &str, index: u32, total: u32) -> String {
    let base = description.trim();
    if base.is_empty() {
        format!("({index}/{total})")
    } else {
        format!("{base} ({index}/{total})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::card::CardDraft;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn loan_installments_follow_monthly_cadence() {
        let plan = InstallmentPlan::new(dec!(100), "Outros", date(2025, 1, 15), 3)
            .with_description("Empréstimo");
        let group = Uuid::new_v4();
        let drafts = plan.expand_with_group("user-1", group).unwrap();

        let dates: Vec<_> = drafts.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2025, 1, 15), date(2025, 2, 15), date(2025, 3, 15)]);
        assert!(drafts.iter().all(|d| d.amount == dec!(100)));
        assert!(drafts.iter().all(|d| d.installment_group_id == Some(group)));
        assert!(drafts.iter().all(|d| d.card_id.is_none()));
        assert_eq!(drafts[0].description, "Empréstimo (1/3)");
        assert_eq!(drafts[2].description, "Empréstimo (3/3)");
    }

    #[test]
    fn loan_dates_clamp_from_start_not_previous_installment() {
        let plan = InstallmentPlan::new(dec!(10), "Outros", date(2025, 1, 31), 3);
        let drafts = plan.expand("u").unwrap();
        assert_eq!(drafts[1].date, date(2025, 2, 28));
        assert_eq!(drafts[2].date, date(2025, 3, 31));
    }

    #[test]
    fn card_installments_use_billing_cycle() {
        let card = Card::from_draft(Uuid::new_v4(), CardDraft::new("u", "Visa", dec!(3000), 10, 28));
        let plan = InstallmentPlan::new(dec!(250), "Lazer", date(2025, 11, 15), 3)
            .on_card(&card)
            .unwrap();
        let drafts = plan.expand("u").unwrap();
        let dates: Vec<_> = drafts.iter().map(|d| d.date).collect();
        assert_eq!(dates, vec![date(2025, 12, 10), date(2026, 1, 10), date(2026, 2, 10)]);
        assert!(drafts.iter().all(|d| d.card_id == Some(card.id)));
    }

    #[test]
    fn empty_description_still_gets_suffix() {
        let drafts = InstallmentPlan::new(dec!(5), "Outros", date(2025, 5, 1), 2)
            .expand("u")
            .unwrap();
        assert_eq!(drafts[0].description, "(1/2)");
    }

    #[test]
    fn rejects_invalid_plans() {
        let zero = InstallmentPlan::new(dec!(10), "Outros", date(2025, 1, 1), 0);
        assert!(zero.expand("u").is_err());
        let free = InstallmentPlan::new(Decimal::ZERO, "Outros", date(2025, 1, 1), 2);
        assert!(free.expand("u").is_err());
        let wrong_category = InstallmentPlan::new(dec!(10), "Cripto", date(2025, 1, 1), 2);
        assert!(wrong_category.expand("u").is_err());
    }

    #[test]
    fn out_of_range_indexes_are_errors() {
        let plan = InstallmentPlan::new(dec!(10), "Outros", date(2025, 1, 1), 2);
        assert!(plan.installment_date(0).is_err());
        assert!(plan.installment_date(u32::MAX).is_err());
        assert!(plan.installment_date(i32::MAX as u32).is_err());
    }

    #[test]
    fn each_expansion_gets_a_new_group() {
        let plan = InstallmentPlan::new(dec!(10), "Outros", date(2025, 1, 1), 2);
        let first = plan.expand("u").unwrap();
        let second = plan.expand("u").unwrap();
        assert_ne!(first[0].installment_group_id, second[0].installment_group_id);
    }
}
