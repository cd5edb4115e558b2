//! Credit card billing cycles: maps a purchase to the statement that bills it.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::calendar::YearMonth;
use crate::errors::{PlannerError, Result};

/// Closing and due days of a card statement.
///
/// When `due_day < closing_day` the statement is paid in the month after it
/// closes (closes on the 28th, due on the 10th). Otherwise it is paid in the
/// same month it closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCycle {
    pub closing_day: u32,
    pub due_day: u32,
}

impl BillingCycle {
    pub fn new(closing_day: u32, due_day: u32) -> Result<Self> {
        validate_day("closing_day", closing_day)?;
        validate_day("due_day", due_day)?;
        Ok(Self {
            closing_day,
            due_day,
        })
    }

    /// Months between the purchase month and the first invoice that bills it.
    fn first_invoice_offset(&self, purchase_date: NaiveDate) -> i32 {
        let mut offset = 0;
        if self.due_day < self.closing_day {
            offset += 1;
        }
        // Purchases on the closing day still land on the statement closing that day.
        if purchase_date.day() > self.closing_day {
            offset += 1;
        }
        offset
    }

    /// Due date of the first statement that includes a purchase made on `purchase_date`.
    pub fn first_invoice(&self, purchase_date: NaiveDate) -> Result<NaiveDate> {
        self.due_date(purchase_date, 1)
    }

    /// Due date of the `installment_index`-th (1-based) installment of a purchase.
    pub fn due_date(&self, purchase_date: NaiveDate, installment_index: u32) -> Result<NaiveDate> {
        if installment_index == 0 {
            return Err(PlannerError::InvalidInput(
                "installment index starts at 1".into(),
            ));
        }
        let months = i32::try_from(installment_index - 1)
            .ok()
            .and_then(|index| index.checked_add(self.first_invoice_offset(purchase_date)))
            .ok_or_else(|| {
                PlannerError::InvalidInput(format!(
                    "installment index {installment_index} is out of range"
                ))
            })?;
        YearMonth::of(purchase_date)
            .shift(months)?
            .day_clamped(self.due_day)
    }
}

/// Resolves the due date of one installment of a card purchase.
///
/// Days that do not exist in the target month (for example a due day of 31
/// in April) are clamped to the month's last day.
pub fn resolve_due_date(
    purchase_date: NaiveDate,
    due_day: u32,
    closing_day: u32,
    installment_index: u32,
) -> Result<NaiveDate> {
    BillingCycle::new(closing_day, due_day)?.due_date(purchase_date, installment_index)
}

fn validate_day(field: &str, day: u32) -> Result<()> {
    if (1..=31).contains(&day) {
        Ok(())
    } else {
        Err(PlannerError::InvalidInput(format!(
            "{field} must be between 1 and 31, got {day}"
        )))
    }
}
