#![allow(dead_code)]

use chrono::NaiveDate;
use planner_core::core::Session;
use planner_core::ledger::{Transaction, TransactionDraft, TransactionKind};
use planner_core::storage::JsonStore;
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

/// Json store rooted in a fresh temp directory. Keep the guard alive for the
/// duration of the test.
pub fn temp_store() -> (TempDir, JsonStore) {
    let temp = TempDir::new().expect("create temp dir");
    let store = JsonStore::new(temp.path().join("users")).expect("create json store");
    (temp, store)
}

pub fn session(user: &str) -> Session {
    Session::new(user, format!("{user}@example.com"))
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn draft(
    user: &str,
    kind: TransactionKind,
    amount: Decimal,
    category: &str,
    on: NaiveDate,
) -> TransactionDraft {
    TransactionDraft::new(user, kind, amount, category, on)
}

pub fn txn(kind: TransactionKind, amount: Decimal, category: &str, on: NaiveDate) -> Transaction {
    Transaction::from_draft(Uuid::new_v4(), draft("user", kind, amount, category, on))
}
