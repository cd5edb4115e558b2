//! Ledger domain models and the pure computations behind the dashboard.

pub mod billing;
pub mod calendar;
pub mod card;
pub mod category;
pub mod installments;
pub mod summary;
pub mod transaction;

pub use billing::{resolve_due_date, BillingCycle};
pub use calendar::{shift_month, YearMonth};
pub use card::{Card, CardDraft};
pub use category::{
    categories_for, EXPENSE_CATEGORIES, INCOME_CATEGORIES, INVESTMENT_CATEGORIES,
};
pub use installments::{InstallmentPlan, PaymentMethod};
pub use summary::{
    available_months, available_years, category_breakdown, default_period, lifetime_totals,
    monthly_pivot, period_totals, period_transactions, CategoryTotal, MonthlySummary, Totals,
};
pub use transaction::{Transaction, TransactionDraft, TransactionKind};
