mod common;

use std::time::Duration;

use common::{date, draft, session, temp_store};
use planner_core::core::services::{CardService, TransactionService};
use planner_core::errors::PlannerError;
use planner_core::ledger::{InstallmentPlan, TransactionKind};
use planner_core::storage::{CachedStore, JsonStore, TransactionStore};
use rust_decimal_macros::dec;
use tempfile::TempDir;

#[test]
fn books_survive_a_new_store_instance() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("users");
    let alice = session("alice");
    {
        let store = JsonStore::new(root.clone()).unwrap();
        TransactionService::record(
            &store,
            &alice,
            draft("alice", TransactionKind::Income, dec!(1500.25), "Salário", date(2025, 4, 5)),
        )
        .unwrap();
        CardService::add(&store, &alice, "Visa", dec!(2000), 10, 28).unwrap();
    }

    let reopened = JsonStore::new(root.clone()).unwrap();
    let txns = reopened.list_transactions("alice").unwrap();
    assert_eq!(txns.len(), 1);
    assert_eq!(txns[0].amount, dec!(1500.25));
    assert_eq!(reopened.list_cards("alice").unwrap()[0].name, "Visa");
}

#[test]
fn users_only_see_their_own_rows() {
    let (_guard, store) = temp_store();
    TransactionService::record(
        &store,
        &session("alice"),
        draft("alice", TransactionKind::Expense, dec!(10), "Lazer", date(2025, 1, 1)),
    )
    .unwrap();
    assert!(store.list_transactions("bob").unwrap().is_empty());
    assert!(store.list_cards("bob").unwrap().is_empty());
}

#[test]
fn session_owner_overrides_draft_owner() {
    let (_guard, store) = temp_store();
    let txn = TransactionService::record(
        &store,
        &session("alice"),
        draft("mallory", TransactionKind::Expense, dec!(10), "Lazer", date(2025, 1, 1)),
    )
    .unwrap();
    assert_eq!(txn.user_id, "alice");
    assert!(store.list_transactions("mallory").unwrap().is_empty());
}

#[test]
fn deleting_another_users_row_changes_nothing() {
    let (_guard, store) = temp_store();
    let txn = TransactionService::record(
        &store,
        &session("alice"),
        draft("alice", TransactionKind::Expense, dec!(10), "Lazer", date(2025, 1, 1)),
    )
    .unwrap();

    let err = TransactionService::delete(&store, &session("bob"), txn.id).unwrap_err();
    assert!(matches!(err, PlannerError::TransactionNotFound(id) if id == txn.id));
    assert_eq!(store.list_transactions("alice").unwrap(), vec![txn]);
}

#[test]
fn mixed_owner_batch_is_rejected_whole() {
    let (_guard, store) = temp_store();
    let batch = vec![
        draft("alice", TransactionKind::Expense, dec!(10), "Lazer", date(2025, 1, 1)),
        draft("bob", TransactionKind::Expense, dec!(10), "Lazer", date(2025, 2, 1)),
    ];
    assert!(store.insert_transactions_batch(batch).is_err());
    assert!(store.list_transactions("alice").unwrap().is_empty());
    assert!(store.list_transactions("bob").unwrap().is_empty());
}

#[test]
fn batch_with_one_invalid_row_writes_nothing() {
    let (_guard, store) = temp_store();
    let batch = vec![
        draft("alice", TransactionKind::Expense, dec!(10), "Lazer", date(2025, 1, 1)),
        draft("alice", TransactionKind::Expense, dec!(0), "Lazer", date(2025, 2, 1)),
    ];
    assert!(store.insert_transactions_batch(batch).is_err());
    assert!(store.list_transactions("alice").unwrap().is_empty());
}

#[test]
fn cached_reads_see_writes_through_the_cache() {
    let (_guard, store) = temp_store();
    let cached = CachedStore::with_ttl(store, Duration::from_secs(3600));
    let alice = session("alice");
    assert!(cached.list_transactions("alice").unwrap().is_empty());

    let plan = InstallmentPlan::new(dec!(50), "Outros", date(2025, 1, 10), 2);
    TransactionService::record_installments(&cached, &alice, &plan).unwrap();
    assert_eq!(cached.list_transactions("alice").unwrap().len(), 2);
}

#[test]
fn cache_serves_stale_rows_until_invalidated() {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("users");
    let cached = CachedStore::with_ttl(JsonStore::new(root.clone()).unwrap(), Duration::from_secs(3600));
    assert!(cached.list_transactions("alice").unwrap().is_empty());

    let direct = JsonStore::new(root.clone()).unwrap();
    direct
        .insert_transaction(draft(
            "alice",
            TransactionKind::Income,
            dec!(1),
            "Salário",
            date(2025, 1, 1),
        ))
        .unwrap();

    assert!(cached.list_transactions("alice").unwrap().is_empty());
    cached.invalidate().unwrap();
    assert_eq!(cached.list_transactions("alice").unwrap().len(), 1);
}

#[test]
fn lookalike_user_ids_get_separate_books() {
    let (_guard, store) = temp_store();
    for user in ["a.b", "a_b", "Alice", "alice"] {
        TransactionService::record(
            &store,
            &session(user),
            draft(user, TransactionKind::Income, dec!(1), "Salário", date(2025, 1, 1)),
        )
        .unwrap();
    }
    for user in ["a.b", "a_b", "Alice", "alice"] {
        let txns = store.list_transactions(user).unwrap();
        assert_eq!(txns.len(), 1, "{user}");
        assert_eq!(txns[0].user_id, user);
    }
}
