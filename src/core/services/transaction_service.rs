//! Business logic helpers for recording and removing transactions.

use tracing::{info, warn};
use uuid::Uuid;

use super::ServiceResult;
use crate::core::Session;
use crate::errors::PlannerError;
use crate::ledger::{InstallmentPlan, Transaction, TransactionDraft};
use crate::storage::TransactionStore;

/// Validated write and read helpers scoped to the session user.
pub struct TransactionService;

impl TransactionService {
    /// Records one single-shot transaction (no installment group).
    pub fn record(
        store: &dyn TransactionStore,
        session: &Session,
        mut draft: TransactionDraft,
    ) -> ServiceResult<Transaction> {
        draft.user_id = session.user_id.clone();
        draft.installment_group_id = None;
        draft.validate()?;
        let txn = store.insert_transaction(draft)?;
        info!(id = %txn.id, kind = %txn.kind, "recorded transaction");
        Ok(txn)
    }

    /// Expands `plan` and persists every installment as one batch.
    ///
    /// Fails unless the store reports every installment as persisted.
    pub fn record_installments(
        store: &dyn TransactionStore,
        session: &Session,
        plan: &InstallmentPlan,
    ) -> ServiceResult<Vec<Transaction>> {
        let drafts = plan.expand(session.user_id())?;
        let expected = drafts.len();
        let created = store.insert_transactions_batch(drafts)?;
        if created.len() != expected {
            warn!(expected, persisted = created.len(), "installment batch incomplete");
            return Err(PlannerError::PartialBatch {
                expected,
                persisted: created.len(),
            });
        }
        info!(
            count = expected,
            group = ?created.first().and_then(|txn| txn.installment_group_id),
            "recorded installments"
        );
        Ok(created)
    }

    /// Charges `plan` to one of the session user's cards.
    pub fn record_card_purchase(
        store: &dyn TransactionStore,
        session: &Session,
        card_id: Uuid,
        plan: InstallmentPlan,
    ) -> ServiceResult<Vec<Transaction>> {
        let card = store
            .list_cards(session.user_id())?
            .into_iter()
            .find(|card| card.id == card_id)
            .ok_or_else(|| PlannerError::CardNotFound(card_id.to_string()))?;
        let plan = plan.on_card(&card)?;
        Self::record_installments(store, session, &plan)
    }

    /// Removes a transaction owned by the session user.
    pub fn delete(store: &dyn TransactionStore, session: &Session, id: Uuid) -> ServiceResult<()> {
        store.delete_transaction(id, session.user_id())?;
        info!(%id, "deleted transaction");
        Ok(())
    }

    pub fn list(store: &dyn TransactionStore, session: &Session) -> ServiceResult<Vec<Transaction>> {
        Ok(store.list_transactions(session.user_id())?)
    }
}
