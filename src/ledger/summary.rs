//! Dashboard aggregations over a flat list of transactions.
//!
//! Every function here is a pure function of its input; nothing is cached
//! between calls.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calendar::YearMonth;
use super::transaction::{Transaction, TransactionKind};

/// Sums per transaction kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub investment: Decimal,
}

impl Totals {
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut totals = Totals::default();
        for txn in transactions {
            totals.add(txn);
        }
        totals
    }

    pub fn add(&mut self, txn: &Transaction) {
        match txn.kind {
            TransactionKind::Income => self.income += txn.amount,
            TransactionKind::Expense => self.expense += txn.amount,
            TransactionKind::Investment => self.investment += txn.amount,
        }
    }

    /// Income minus expense. Investments are reported separately.
    pub fn balance(&self) -> Decimal {
        self.income - self.expense
    }

    pub fn get(&self, kind: TransactionKind) -> Decimal {
        match kind {
            TransactionKind::Income => self.income,
            TransactionKind::Expense => self.expense,
            TransactionKind::Investment => self.investment,
        }
    }
}

/// One row of the monthly pivot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub period: YearMonth,
    pub income: Decimal,
    pub expense: Decimal,
    pub investment: Decimal,
    /// Income minus expense for this month.
    pub balance: Decimal,
    /// Sum of `balance` over this month and every earlier month.
    pub cumulative_balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}

pub fn lifetime_totals(transactions: &[Transaction]) -> Totals {
    Totals::from_transactions(transactions)
}

pub fn period_totals(transactions: &[Transaction], period: YearMonth) -> Totals {
    Totals::from_transactions(transactions.iter().filter(|txn| period.contains(txn.date)))
}

/// Rows for the history table of `period`, newest first.
pub fn period_transactions(transactions: &[Transaction], period: YearMonth) -> Vec<Transaction> {
    let mut rows: Vec<Transaction> = transactions
        .iter()
        .filter(|txn| period.contains(txn.date))
        .cloned()
        .collect();
    rows.sort_by(|a, b| b.date.cmp(&a.date));
    rows
}

/// Years present in the data, most recent first.
pub fn available_years(transactions: &[Transaction]) -> Vec<i32> {
    let years: BTreeSet<i32> = transactions.iter().map(|txn| txn.date.year()).collect();
    years.into_iter().rev().collect()
}

/// Months present anywhere in the data (any year), ascending.
pub fn available_months(transactions: &[Transaction]) -> Vec<u32> {
    let months: BTreeSet<u32> = transactions.iter().map(|txn| txn.date.month()).collect();
    months.into_iter().collect()
}

/// Period selected when the dashboard opens.
///
/// The current month wins when it has data. Otherwise the most recent year
/// with data is chosen together with the *earliest* month present in that
/// year. With no data at all, the current month is used.
pub fn default_period(transactions: &[Transaction], today: NaiveDate) -> YearMonth {
    let current = YearMonth::of(today);
    if transactions.iter().any(|txn| current.contains(txn.date)) {
        return current;
    }
    let Some(latest_year) = transactions.iter().map(|txn| txn.date.year()).max() else {
        return current;
    };
    transactions
        .iter()
        .filter(|txn| txn.date.year() == latest_year)
        .map(|txn| YearMonth::of(txn.date))
        .min()
        .unwrap_or(current)
}

/// Per-month totals in calendar order with the lifetime running balance.
pub fn monthly_pivot(transactions: &[Transaction]) -> Vec<MonthlySummary> {
    let mut months: BTreeMap<YearMonth, Totals> = BTreeMap::new();
    for txn in transactions {
        months.entry(YearMonth::of(txn.date)).or_default().add(txn);
    }

    let mut running = Decimal::ZERO;
    months
        .into_iter()
        .map(|(period, totals)| {
            let balance = totals.balance();
            running += balance;
            MonthlySummary {
                period,
                income: totals.income,
                expense: totals.expense,
                investment: totals.investment,
                balance,
                cumulative_balance: running,
            }
        })
        .collect()
}

/// Sums of `kind` per category, optionally limited to one month.
///
/// Categories that add up to zero are left out. Ordered by total descending,
/// then by name.
pub fn category_breakdown(
    transactions: &[Transaction],
    kind: TransactionKind,
    period: Option<YearMonth>,
) -> Vec<CategoryTotal> {
    let mut sums: HashMap<&str, Decimal> = HashMap::new();
    for txn in transactions
        .iter()
        .filter(|txn| txn.kind == kind)
        .filter(|txn| period.map_or(true, |p| p.contains(txn.date)))
    {
        *sums.entry(txn.category.as_str()).or_default() += txn.amount;
    }

    let mut slices: Vec<CategoryTotal> = sums
        .into_iter()
        .filter(|(_, total)| !total.is_zero())
        .map(|(category, total)| CategoryTotal {
            category: category.to_string(),
            total,
        })
        .collect();
    slices.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
    slices
}
