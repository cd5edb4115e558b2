use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};
use uuid::Uuid;

use super::{batch_owner, TransactionStore};
use crate::errors::{PlannerError, Result};
use crate::ledger::{Card, CardDraft, Transaction, TransactionDraft};

#[derive(Debug, Default)]
struct MemoryState {
    transactions: Vec<Transaction>,
    cards: Vec<Card>,
}

/// Process-local store. Useful for tests and for embedding without disk access.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| PlannerError::StorageError("in-memory store lock poisoned".into()))
    }

    /// Number of transactions across all users.
    pub fn transaction_count(&self) -> Result<usize> {
        Ok(self.lock()?.transactions.len())
    }
}

impl TransactionStore for InMemoryStore {
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let state = self.lock()?;
        let rows: Vec<Transaction> = state
            .transactions
            .iter()
            .filter(|txn| txn.user_id == user_id)
            .cloned()
            .collect();
        debug!(user_id, count = rows.len(), "listed transactions");
        Ok(rows)
    }

    fn insert_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        draft.validate()?;
        let txn = Transaction::from_draft(Uuid::new_v4(), draft);
        self.lock()?.transactions.push(txn.clone());
        info!(id = %txn.id, user_id = %txn.user_id, "inserted transaction");
        Ok(txn)
    }

    fn insert_transactions_batch(&self, drafts: Vec<TransactionDraft>) -> Result<Vec<Transaction>> {
        batch_owner(&drafts)?;
        let created: Vec<Transaction> = drafts
            .into_iter()
            .map(|draft| Transaction::from_draft(Uuid::new_v4(), draft))
            .collect();
        self.lock()?.transactions.extend(created.iter().cloned());
        info!(count = created.len(), "inserted transaction batch");
        Ok(created)
    }

    fn delete_transaction(&self, id: Uuid, user_id: &str) -> Result<()> {
        let mut state = self.lock()?;
        let position = state
            .transactions
            .iter()
            .position(|txn| txn.id == id && txn.user_id == user_id)
            .ok_or(PlannerError::TransactionNotFound(id))?;
        state.transactions.remove(position);
        info!(%id, user_id, "deleted transaction");
        Ok(())
    }

    fn list_cards(&self, user_id: &str) -> Result<Vec<Card>> {
        let state = self.lock()?;
        let mut cards: Vec<Card> = state
            .cards
            .iter()
            .filter(|card| card.user_id == user_id)
            .cloned()
            .collect();
        cards.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cards)
    }

    fn insert_card(&self, draft: CardDraft) -> Result<Card> {
        draft.validate()?;
        let card = Card::from_draft(Uuid::new_v4(), draft);
        self.lock()?.cards.push(card.clone());
        info!(id = %card.id, name = %card.name, "inserted card");
        Ok(card)
    }
}
