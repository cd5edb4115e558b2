use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::ServiceResult;
use crate::core::Session;
use crate::ledger::{
    available_months, available_years, category_breakdown, default_period, lifetime_totals,
    monthly_pivot, period_totals, period_transactions, CategoryTotal, MonthlySummary, Totals,
    Transaction, TransactionKind, YearMonth,
};
use crate::storage::TransactionStore;

/// Every figure shown on the dashboard for one period selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub period: YearMonth,
    pub available_years: Vec<i32>,
    pub available_months: Vec<u32>,
    pub lifetime: Totals,
    pub month: Totals,
    pub history: Vec<Transaction>,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub investments_by_category: Vec<CategoryTotal>,
    /// Lifetime pivot; never narrowed by the period selection.
    pub trend: Vec<MonthlySummary>,
}

pub struct SummaryService;

impl SummaryService {
    /// Loads the session user's transactions and builds the dashboard.
    pub fn dashboard(
        store: &dyn TransactionStore,
        session: &Session,
        today: NaiveDate,
        selected: Option<YearMonth>,
    ) -> ServiceResult<Dashboard> {
        let transactions = store.list_transactions(session.user_id())?;
        debug!(count = transactions.len(), "building dashboard");
        Ok(Self::build(&transactions, today, selected))
    }

    /// Builds the dashboard from an already loaded transaction set.
    pub fn build(
        transactions: &[Transaction],
        today: NaiveDate,
        selected: Option<YearMonth>,
    ) -> Dashboard {
        let period = selected.unwrap_or_else(|| default_period(transactions, today));
        Dashboard {
            period,
            available_years: available_years(transactions),
            available_months: available_months(transactions),
            lifetime: lifetime_totals(transactions),
            month: period_totals(transactions, period),
            history: period_transactions(transactions, period),
            expenses_by_category: category_breakdown(
                transactions,
                TransactionKind::Expense,
                Some(period),
            ),
            investments_by_category: category_breakdown(
                transactions,
                TransactionKind::Investment,
                Some(period),
            ),
            trend: monthly_pivot(transactions),
        }
    }

    pub fn trend(
        store: &dyn TransactionStore,
        session: &Session,
    ) -> ServiceResult<Vec<MonthlySummary>> {
        Ok(monthly_pivot(&store.list_transactions(session.user_id())?))
    }
}
