pub mod cache;
pub mod json_backend;
pub mod memory;

use uuid::Uuid;

use crate::errors::Result;
use crate::ledger::{Card, CardDraft, Transaction, TransactionDraft};

/// Persistence of transactions and cards, scoped by an opaque user id.
///
/// Every call returns a uniform `Result`; backends never signal failure
/// through the shape of a successful value.
pub trait TransactionStore: Send + Sync {
    /// All transactions owned by `user_id`, in no particular order.
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;

    fn insert_transaction(&self, draft: TransactionDraft) -> Result<Transaction>;

    /// Inserts every draft or none of them. All drafts must share one owner.
    fn insert_transactions_batch(&self, drafts: Vec<TransactionDraft>) -> Result<Vec<Transaction>>;

    /// Deletes a transaction owned by `user_id`. Ids owned by someone else are
    /// reported as not found and left untouched.
    fn delete_transaction(&self, id: Uuid, user_id: &str) -> Result<()>;

    /// Cards owned by `user_id`, ordered by name.
    fn list_cards(&self, user_id: &str) -> Result<Vec<Card>>;

    fn insert_card(&self, draft: CardDraft) -> Result<Card>;
}

impl<T: TransactionStore + ?Sized> TransactionStore for Box<T> {
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        (**self).list_transactions(user_id)
    }

    fn insert_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        (**self).insert_transaction(draft)
    }

    fn insert_transactions_batch(&self, drafts: Vec<TransactionDraft>) -> Result<Vec<Transaction>> {
        (**self).insert_transactions_batch(drafts)
    }

    fn delete_transaction(&self, id: Uuid, user_id: &str) -> Result<()> {
        (**self).delete_transaction(id, user_id)
    }

    fn list_cards(&self, user_id: &str) -> Result<Vec<Card>> {
        (**self).list_cards(user_id)
    }

    fn insert_card(&self, draft: CardDraft) -> Result<Card> {
        (**self).insert_card(draft)
    }
}

/// Validates a batch before anything is written and returns its owner.
pub(crate) fn batch_owner(drafts: &[TransactionDraft]) -> Result<&str> {
    use crate::errors::PlannerError;

    let first = drafts
        .first()
        .ok_or_else(|| PlannerError::InvalidInput("batch insert requires at least one transaction".into()))?;
    for draft in drafts {
        draft.validate()?;
        if draft.user_id != first.user_id {
            return Err(PlannerError::InvalidInput(
                "batch insert cannot mix transactions of different users".into(),
            ));
        }
    }
    Ok(first.user_id.as_str())
}

pub use cache::CachedStore;
pub use json_backend::JsonStore;
pub use memory::InMemoryStore;
