use rust_decimal::Decimal;
use tracing::info;

use super::ServiceResult;
use crate::core::Session;
use crate::ledger::{Card, CardDraft};
use crate::storage::TransactionStore;

pub struct CardService;

impl CardService {
    pub fn add(
        store: &dyn TransactionStore,
        session: &Session,
        name: &str,
        limit: Decimal,
        due_day: u32,
        closing_day: u32,
    ) -> ServiceResult<Card> {
        let draft = CardDraft::new(session.user_id(), name.trim(), limit, due_day, closing_day);
        draft.validate()?;
        let card = store.insert_card(draft)?;
        info!(id = %card.id, name = %card.name, "added card");
        Ok(card)
    }

    pub fn list(store: &dyn TransactionStore, session: &Session) -> ServiceResult<Vec<Card>> {
        Ok(store.list_cards(session.user_id())?)
    }

    /// Finds a card by name, ignoring case.
    pub fn find_by_name(
        store: &dyn TransactionStore,
        session: &Session,
        name: &str,
    ) -> ServiceResult<Option<Card>> {
        let needle = name.trim().to_lowercase();
        Ok(Self::list(store, session)?
            .into_iter()
            .find(|card| card.name.to_lowercase() == needle))
    }
}
