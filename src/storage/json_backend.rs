use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{batch_owner, TransactionStore};
use crate::{
    core::utils::{ensure_dir, write_atomic, PathResolver},
    errors::{PlannerError, Result},
    ledger::{Card, CardDraft, Transaction, TransactionDraft},
};

const BOOK_EXTENSION: &str = "json";

pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Everything stored for one user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserBook {
    #[serde(default = "UserBook::schema_version_default")]
    pub schema_version: u32,
    pub user_id: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub cards: Vec<Card>,
}

impl UserBook {
    fn empty(user_id: &str) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            user_id: user_id.to_string(),
            transactions: Vec::new(),
            cards: Vec::new(),
        }
    }

    fn schema_version_default() -> u32 {
        CURRENT_SCHEMA_VERSION
    }
}

/// File-backed store keeping one JSON document per user.
///
/// Writes go to a temporary file that is then renamed over the document, so
/// a batch insert either lands completely or leaves the previous file intact.
pub struct JsonStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Opens the store under the default data directory.
    pub fn new_default() -> Result<Self> {
        Self::new(PathResolver::store_dir_in(&PathResolver::base_dir()))
    }

    pub fn base_dir(&self) -> &Path {
        &self.root
    }

    pub fn book_path(&self, user_id: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", canonical_name(user_id), BOOK_EXTENSION))
    }

    pub fn load_book(&self, user_id: &str) -> Result<UserBook> {
        let path = self.book_path(user_id);
        if !path.exists() {
            return Ok(UserBook::empty(user_id));
        }
        let data = fs::read_to_string(&path)?;
        let book: UserBook = serde_json::from_str(&data)?;
        if book.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(PlannerError::StorageError(format!(
                "`{}` was written by a newer schema version",
                path.display()
            )));
        }
        if book.user_id != user_id {
            warn!(path = %path.display(), "book owner does not match requested user");
            return Err(PlannerError::StorageError(format!(
                "`{}` belongs to a different user",
                path.display()
            )));
        }
        Ok(book)
    }

    fn save_book(&self, book: &UserBook) -> Result<()> {
        let path = self.book_path(&book.user_id);
        let json = serde_json::to_string_pretty(book)?;
        write_atomic(&path, &json)
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| PlannerError::StorageError("json store lock poisoned".into()))
    }

    fn update_book<T>(&self, user_id: &str, apply: impl FnOnce(&mut UserBook) -> Result<T>) -> Result<T> {
        let _guard = self.lock()?;
        let mut book = self.load_book(user_id)?;
        let outcome = apply(&mut book)?;
        self.save_book(&book)?;
        Ok(outcome)
    }
}

impl TransactionStore for JsonStore {
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let book = self.load_book(user_id)?;
        debug!(user_id, count = book.transactions.len(), "loaded transactions");
        Ok(book.transactions)
    }

    fn insert_transaction(&self, draft: TransactionDraft) -> Result<Transaction> {
        draft.validate()?;
        let user_id = draft.user_id.clone();
        let txn = Transaction::from_draft(Uuid::new_v4(), draft);
        self.update_book(&user_id, |book| {
            book.transactions.push(txn.clone());
            Ok(())
        })?;
        info!(id = %txn.id, user_id = %user_id, "inserted transaction");
        Ok(txn)
    }

    fn insert_transactions_batch(&self, drafts: Vec<TransactionDraft>) -> Result<Vec<Transaction>> {
        let user_id = batch_owner(&drafts)?.to_string();
        let created: Vec<Transaction> = drafts
            .into_iter()
            .map(|draft| Transaction::from_draft(Uuid::new_v4(), draft))
            .collect();
        self.update_book(&user_id, |book| {
            book.transactions.extend(created.iter().cloned());
            Ok(())
        })?;
        info!(user_id = %user_id, count = created.len(), "inserted transaction batch");
        Ok(created)
    }

    fn delete_transaction(&self, id: Uuid, user_id: &str) -> Result<()> {
        self.update_book(user_id, |book| {
            let position = book
                .transactions
                .iter()
                .position(|txn| txn.id == id)
                .ok_or(PlannerError::TransactionNotFound(id))?;
            book.transactions.remove(position);
            Ok(())
        })?;
        info!(%id, user_id, "deleted transaction");
        Ok(())
    }

    fn list_cards(&self, user_id: &str) -> Result<Vec<Card>> {
        let mut cards = self.load_book(user_id)?.cards;
        cards.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cards)
    }

    fn insert_card(&self, draft: CardDraft) -> Result<Card> {
        draft.validate()?;
        let user_id = draft.user_id.clone();
        let card = Card::from_draft(Uuid::new_v4(), draft);
        self.update_book(&user_id, |book| {
            book.cards.push(card.clone());
            Ok(())
        })?;
        info!(id = %card.id, name = %card.name, "inserted card");
        Ok(card)
    }
}

/// File stem for a user's book.
///
/// Ids made only of `[a-z0-9-]` (uuids, slugs) are used as-is. Anything else
/// keeps a readable sanitized prefix followed by `_` and the hex bytes of the
/// raw id. `_` never appears in the plain form, so distinct ids never share
/// a file.
fn canonical_name(user_id: &str) -> String {
    let plain = !user_id.is_empty()
        && user_id
            .chars()
            .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '-'));
    if plain {
        return user_id.to_string();
    }

    let mut name: String = user_id
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' | '-' => c,
            _ => '_',
        })
        .take(32)
        .collect();
    if name.trim_matches('_').is_empty() {
        name = "user".into();
    }
    name.push('_');
    for byte in user_id.as_bytes() {
        let _ = write!(name, "{byte:02x}");
    }
    name
}
