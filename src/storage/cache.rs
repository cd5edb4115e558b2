use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;
use uuid::Uuid;

use super::TransactionStore;
use crate::errors::{PlannerError, Result};
use crate::ledger::{Card, CardDraft, Transaction, TransactionDraft};

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct Entry<T> {
    fetched_at: Instant,
    value: T,
}

#[derive(Default)]
struct CacheState {
    transactions: HashMap<String, Entry<Vec<Transaction>>>,
    cards: HashMap<String, Entry<Vec<Card>>>,
    /// Bumped on every clear; fetches started under an older generation are
    /// not stored.
    generation: u64,
}

impl CacheState {
    fn clear(&mut self) {
        self.transactions.clear();
        self.cards.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Read-through cache for the transaction and card lists.
///
/// Lists are reused for `ttl`. Any write clears the whole cache, whether the
/// write succeeded or not, so the next read always reflects the store.
pub struct CachedStore<S> {
    inner: S,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl<S: TransactionStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_TTL)
    }

    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn invalidate(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, CacheState>> {
        self.state
            .lock()
            .map_err(|_| PlannerError::StorageError("cache lock poisoned".into()))
    }

    fn fresh(&self, fetched_at: Instant) -> bool {
        fetched_at.elapsed() < self.ttl
    }

    /// Serves `user_id`'s entry from `slot` while fresh, otherwise fetches and
    /// stores it unless the cache was cleared during the fetch.
    fn read_through<T: Clone>(
        &self,
        user_id: &str,
        slot: fn(&mut CacheState) -> &mut HashMap<String, Entry<T>>,
        fetch: impl FnOnce() -> Result<T>,
    ) -> Result<T> {
        let generation = {
            let mut state = self.lock()?;
            if let Some(entry) = slot(&mut *state).get(user_id) {
                if self.fresh(entry.fetched_at) {
                    debug!(user_id, "served from cache");
                    return Ok(entry.value.clone());
                }
            }
            state.generation
        };

        let value = fetch()?;

        let mut state = self.lock()?;
        if state.generation == generation {
            slot(&mut *state).insert(
                user_id.to_string(),
                Entry {
                    fetched_at: Instant::now(),
                    value: value.clone(),
                },
            );
        } else {
            debug!(user_id, "cache cleared during fetch, result not stored");
        }
        Ok(value)
    }

    fn after_write<T>(&self, outcome: Result<T>) -> Result<T> {
        self.invalidate()?;
        outcome
    }
}

impl<S: TransactionStore> TransactionStore for CachedStore<S> {
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        self.read_through(user_id, |state| &mut state.transactions, || {
            self.inner.list_transactions(user_id)
        })
    }

    fn insert_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        self.after_write(self.inner.insert_transaction(draft))
    }

    fn insert_transactions_batch(&self, drafts: Vec<TransactionDraft>) -> Result<Vec<Transaction>> {
        self.after_write(self.inner.insert_transactions_batch(drafts))
    }

    fn delete_transaction(&self, id: Uuid, user_id: &str) -> Result<()> {
        self.after_write(self.inner.delete_transaction(id, user_id))
    }

    fn list_cards(&self, user_id: &str) -> Result<Vec<Card>> {
        self.read_through(user_id, |state| &mut state.cards, || self.inner.list_cards(user_id))
    }

    fn insert_card(&self, draft: CardDraft) -> Result<Card> {
        self.after_write(self.inner.insert_card(draft))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::TransactionKind;
    use crate::storage::InMemoryStore;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::{mpsc, Arc};
    use std::thread;

    fn draft() -> TransactionDraft {
        TransactionDraft::new(
            "alice",
            TransactionKind::Expense,
            dec!(12),
            "Lazer",
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        )
    }

    #[test]
    fn cached_list_hides_writes_made_behind_its_back() {
        let cached = CachedStore::new(InMemoryStore::new());
        assert!(cached.list_transactions("alice").unwrap().is_empty());
        cached.inner().insert_transaction(draft()).unwrap();
        assert!(cached.list_transactions("alice").unwrap().is_empty());
    }

    #[test]
    fn writes_through_the_cache_invalidate_it() {
        let cached = CachedStore::new(InMemoryStore::new());
        assert!(cached.list_transactions("alice").unwrap().is_empty());
        let txn = cached.insert_transaction(draft()).unwrap();
        assert_eq!(cached.list_transactions("alice").unwrap().len(), 1);
        cached.delete_transaction(txn.id, "alice").unwrap();
        assert!(cached.list_transactions("alice").unwrap().is_empty());
    }

    #[test]
    fn failed_writes_still_invalidate() {
        let cached = CachedStore::new(InMemoryStore::new());
        cached.list_transactions("alice").unwrap();
        cached.inner().insert_transaction(draft()).unwrap();
        assert!(cached.delete_transaction(Uuid::new_v4(), "alice").is_err());
        assert_eq!(cached.list_transactions("alice").unwrap().len(), 1);
    }

    #[test]
    fn zero_ttl_always_refetches() {
        let cached = CachedStore::with_ttl(InMemoryStore::new(), Duration::ZERO);
        cached.list_transactions("alice").unwrap();
        cached.inner().insert_transaction(draft()).unwrap();
        assert_eq!(cached.list_transactions("alice").unwrap().len(), 1);
    }

    #[test]
    fn card_inserts_refresh_card_list() {
        let cached = CachedStore::new(InMemoryStore::new());
        assert!(cached.list_cards("alice").unwrap().is_empty());
        cached
            .insert_card(CardDraft::new("alice", "Visa", dec!(1000), 10, 28))
            .unwrap();
        assert_eq!(cached.list_cards("alice").unwrap().len(), 1);
    }

    /// Parks the first list call after it has read its rows, until released.
    struct PausedStore {
        inner: InMemoryStore,
        fetched: Mutex<Option<mpsc::Sender<()>>>,
        resume: Mutex<Option<mpsc::Receiver<()>>>,
    }

    impl TransactionStore for PausedStore {
        fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
            let rows = self.inner.list_transactions(user_id)?;
            if let Some(fetched) = self.fetched.lock().unwrap().take() {
                fetched.send(()).unwrap();
                let resume = self.resume.lock().unwrap().take().unwrap();
                resume.recv().unwrap();
            }
            Ok(rows)
        }

        fn insert_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
            self.inner.insert_transaction(draft)
        }

        fn insert_transactions_batch(&self, drafts: Vec<TransactionDraft>) -> Result<Vec<Transaction>> {
            self.inner.insert_transactions_batch(drafts)
        }

        fn delete_transaction(&self, id: Uuid, user_id: &str) -> Result<()> {
            self.inner.delete_transaction(id, user_id)
        }

        fn list_cards(&self, user_id: &str) -> Result<Vec<Card>> {
            self.inner.list_cards(user_id)
        }

        fn insert_card(&self, draft: CardDraft) -> Result<Card> {
            self.inner.insert_card(draft)
        }
    }

    #[test]
    fn list_fetched_before_a_write_is_not_cached() {
        let (fetched_tx, fetched_rx) = mpsc::channel();
        let (resume_tx, resume_rx) = mpsc::channel();
        let cached = Arc::new(CachedStore::with_ttl(
            PausedStore {
                inner: InMemoryStore::new(),
                fetched: Mutex::new(Some(fetched_tx)),
                resume: Mutex::new(Some(resume_rx)),
            },
            Duration::from_secs(3600),
        ));

        let reader = {
            let cached = Arc::clone(&cached);
            thread::spawn(move || cached.list_transactions("alice").unwrap())
        };
        fetched_rx.recv().unwrap();
        cached.insert_transaction(draft()).unwrap();
        resume_tx.send(()).unwrap();

        assert!(reader.join().unwrap().is_empty());
        assert_eq!(cached.list_transactions("alice").unwrap().len(), 1);
    }
}
