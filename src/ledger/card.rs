use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::billing::BillingCycle;
use crate::errors::{PlannerError, Result};

/// A user-defined credit card profile. The limit is informational only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub limit: Decimal,
    pub closing_day: u32,
    pub due_day: u32,
}

impl Card {
    pub fn from_draft(id: Uuid, draft: CardDraft) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            name: draft.name,
            limit: draft.limit,
            closing_day: draft.closing_day,
            due_day: draft.due_day,
        }
    }

    pub fn billing_cycle(&self) -> Result<BillingCycle> {
        BillingCycle::new(self.closing_day, self.due_day)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardDraft {
    pub user_id: String,
    pub name: String,
    pub limit: Decimal,
    pub due_day: u32,
    pub closing_day: u32,
}

impl CardDraft {
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        limit: Decimal,
        due_day: u32,
        closing_day: u32,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            name: name.into(),
            limit,
            due_day,
            closing_day,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(PlannerError::InvalidInput("user id is required".into()));
        }
        if self.name.trim().is_empty() {
            return Err(PlannerError::InvalidInput("card name is required".into()));
        }
        if self.limit < Decimal::ZERO {
            return Err(PlannerError::InvalidInput(
                "card limit cannot be negative".into(),
            ));
        }
        BillingCycle::new(self.closing_day, self.due_day).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn validate_checks_days_and_name() {
        assert!(CardDraft::new("u", "Nubank", dec!(5000), 10, 28).validate().is_ok());
        assert!(CardDraft::new("u", " ", dec!(5000), 10, 28).validate().is_err());
        assert!(CardDraft::new("u", "Inter", dec!(5000), 0, 28).validate().is_err());
        assert!(CardDraft::new("u", "Inter", dec!(5000), 10, 40).validate().is_err());
        assert!(CardDraft::new("u", "Inter", dec!(-1), 10, 28).validate().is_err());
    }

    #[test]
    fn billing_cycle_uses_card_days() {
        let card = Card::from_draft(Uuid::new_v4(), CardDraft::new("u", "Nubank", dec!(0), 10, 28));
        let cycle = card.billing_cycle().unwrap();
        assert_eq!(cycle.closing_day, 28);
        assert_eq!(cycle.due_day, 10);
    }
}
