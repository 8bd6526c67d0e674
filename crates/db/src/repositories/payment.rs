//! Payment recorder and cheque lifecycle.
//!
//! Recording a payment touches, in order: the payment sequence, the payment
//! row, the cash or bank ledger (or a pending cheque), the party balance and
//! the linked document's settlement. Deleting walks the same steps backwards.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use tallybook_core::audit::{
    Actor, DocumentField, FieldChange, HistoryAction, describe_payment,
};
use tallybook_core::cashbank::LedgerAccount;
use tallybook_core::party::BalanceEvent;
use tallybook_core::payment::{
    ChequeStatus, PaymentDirection, PaymentError, PaymentInput, PaymentMode, PaymentService,
    Settlement,
};
use tallybook_core::sequence::SequenceKind;
use tallybook_core::workflow::{StatusEffect, StatusMachine};
use tallybook_shared::config::NumberingConfig;
use tallybook_shared::types::{
    BankAccountId, ChequeId, DocumentId, LedgerEntryId, PartyId, PaymentId,
};
use tracing::{debug, info};

use super::cashbank::{self, NewEntry};
use super::document::find_document;
use super::{history, party, sequence};
use crate::entities::{cheques, documents, payments};
use crate::error::EngineError;
use crate::tx::with_transaction;

/// Moves a linked document's settlement by `amount` (negative to reverse)
/// and writes its history row.
async fn settle_document<C: ConnectionTrait>(
    conn: &C,
    document: documents::Model,
    amount: Decimal,
    action: HistoryAction,
    description: String,
    actor: &Actor,
) -> Result<(), EngineError> {
    let kind = document.kind()?;
    let status = document.status()?;
    let document_id = document.document_id();

    let (settlement, effect): (Settlement, Option<StatusEffect>) = if amount >= Decimal::ZERO {
        let settlement = Settlement::apply(document.total, document.amount_paid, amount);
        let effect = StatusMachine::after_payment(kind, status, settlement.is_settled());
        (settlement, effect)
    } else {
        let settlement = Settlement::reverse(document.total, document.amount_paid, -amount);
        let effect = StatusMachine::after_payment_reversal(
            kind,
            status,
            settlement.amount_paid,
            settlement.is_settled(),
        );
        (settlement, effect)
    };

    let mut changes = vec![FieldChange {
        field: DocumentField::AmountDue,
        old: document.amount_due.into(),
        new: settlement.amount_due.into(),
    }];

    let mut active = document.into_active_model();
    active.amount_paid = Set(settlement.amount_paid);
    active.amount_due = Set(settlement.amount_due);
    if let Some(effect) = effect {
        active.status = Set(effect.to.as_str().to_string());
        changes.push(FieldChange::status(effect.from, effect.to));
    }
    active.updated_at = Set(Utc::now());
    active.update(conn).await?;

    history::append(conn, document_id, action, description, &changes, actor).await?;

    debug!(
        document_id = %document_id,
        amount_paid = %settlement.amount_paid,
        amount_due = %settlement.amount_due,
        status_changed = effect.is_some(),
        "Document settlement updated"
    );
    Ok(())
}

/// Records a payment inside the caller's transaction.
pub async fn record_in<C: ConnectionTrait>(
    conn: &C,
    input: PaymentInput,
    numbering: &NumberingConfig,
    actor: &Actor,
) -> Result<payments::Model, EngineError> {
    PaymentService::validate_amount(input.amount)?;

    let document = match input.document_id {
        Some(id) => Some(find_document(conn, id).await?),
        None => None,
    };
    let (direction, party_id) = match &document {
        Some(doc) => (
            PaymentService::direction_for_document(doc.kind()?, doc.status()?)?,
            doc.party_id(),
        ),
        None => (
            input.direction.ok_or(PaymentError::DirectionRequired)?,
            Some(input.party_id.ok_or(PaymentError::PartyRequired)?),
        ),
    };

    let number = sequence::next_number(conn, direction.sequence(), numbering).await?;

    let ledger_entry_id = match input.mode.immediate_account() {
        Some(account) => {
            let entry = cashbank::append(
                conn,
                account,
                NewEntry {
                    date: input.date,
                    entry_type: direction.movement(account),
                    amount: direction.signed(input.amount),
                    description: format!("Payment {number}"),
                    party_id,
                    document_id: input.document_id,
                    payment_id: Some(input.payment_id),
                },
            )
            .await?;
            Some(entry.id)
        }
        None => None,
    };

    let payment = payments::ActiveModel {
        id: Set(input.payment_id.into_inner()),
        number: Set(number.clone()),
        direction: Set(direction.as_str().to_string()),
        document_id: Set(input.document_id.map(DocumentId::into_inner)),
        party_id: Set(party_id.map(PartyId::into_inner)),
        amount: Set(input.amount),
        mode: Set(input.mode.as_str().to_string()),
        bank_account_id: Set(input.mode.bank_account_id().map(BankAccountId::into_inner)),
        reference: Set(input.reference.clone()),
        date: Set(input.date),
        ledger_entry_id: Set(ledger_entry_id),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    if let PaymentMode::Cheque { cheque_number, account_id } = &input.mode {
        let cheque_seq = sequence::next_number(conn, SequenceKind::Cheque, numbering).await?;
        cheques::ActiveModel {
            id: Set(ChequeId::new().into_inner()),
            number: Set(cheque_seq),
            payment_id: Set(payment.id),
            cheque_number: Set(cheque_number.clone()),
            direction: Set(direction.as_str().to_string()),
            amount: Set(input.amount),
            bank_account_id: Set(account_id.map(BankAccountId::into_inner)),
            party_id: Set(party_id.map(PartyId::into_inner)),
            status: Set(ChequeStatus::Pending.as_str().to_string()),
            ledger_entry_id: Set(None),
            date: Set(input.date),
            cleared_at: Set(None),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await?;
    }

    party::apply_event(
        conn,
        party_id,
        direction.balance_side(),
        BalanceEvent::PaymentRecorded {
            amount: input.amount,
        },
    )
    .await?;

    if let Some(document) = document {
        let description = describe_payment(HistoryAction::PaymentRecorded, &number, input.amount);
        settle_document(
            conn,
            document,
            input.amount,
            HistoryAction::PaymentRecorded,
            description,
            actor,
        )
        .await?;
    }

    Ok(payment)
}

/// Undoes the party and document effects of a payment and deletes its row.
async fn reverse_and_remove<C: ConnectionTrait>(
    conn: &C,
    payment: payments::Model,
    actor: &Actor,
) -> Result<(), EngineError> {
    let direction = payment.direction()?;

    if let Some(document_id) = payment.linked_document() {
        let document = find_document(conn, document_id).await?;
        let description =
            describe_payment(HistoryAction::PaymentDeleted, &payment.number, payment.amount);
        settle_document(
            conn,
            document,
            -payment.amount,
            HistoryAction::PaymentDeleted,
            description,
            actor,
        )
        .await?;
    }

    party::apply_event(
        conn,
        payment.party_id.map(PartyId::from),
        direction.balance_side(),
        BalanceEvent::PaymentDeleted {
            amount: payment.amount,
        },
    )
    .await?;

    payments::Entity::delete_by_id(payment.id).exec(conn).await?;
    Ok(())
}

async fn find_payment<C: ConnectionTrait>(
    conn: &C,
    payment_id: PaymentId,
) -> Result<payments::Model, EngineError> {
    payments::Entity::find_by_id(payment_id.into_inner())
        .one(conn)
        .await?
        .ok_or(EngineError::PaymentNotFound(payment_id))
}

async fn find_cheque<C: ConnectionTrait>(
    conn: &C,
    cheque_id: ChequeId,
) -> Result<cheques::Model, EngineError> {
    cheques::Entity::find_by_id(cheque_id.into_inner())
        .one(conn)
        .await?
        .ok_or(EngineError::ChequeNotFound(cheque_id))
}

/// Deletes a payment inside the caller's transaction, reversing every effect.
pub async fn delete_in<C: ConnectionTrait>(
    conn: &C,
    payment_id: PaymentId,
    actor: &Actor,
) -> Result<(), EngineError> {
    let payment = find_payment(conn, payment_id).await?;

    let cheque = cheques::Entity::find()
        .filter(cheques::Column::PaymentId.eq(payment.id))
        .one(conn)
        .await?;
    match cheque {
        Some(cheque) => {
            if let Some(entry_id) = cheque.ledger_entry_id {
                cashbank::remove(conn, LedgerEntryId::from(entry_id)).await?;
            }
            cheques::Entity::delete_by_id(cheque.id).exec(conn).await?;
        }
        None => {
            if let Some(entry_id) = payment.ledger_entry_id {
                cashbank::remove(conn, LedgerEntryId::from(entry_id)).await?;
            }
        }
    }

    reverse_and_remove(conn, payment, actor).await
}

/// Payments linked to a document, in creation order.
pub async fn for_document<C: ConnectionTrait>(
    conn: &C,
    document_id: DocumentId,
) -> Result<Vec<payments::Model>, EngineError> {
    Ok(payments::Entity::find()
        .filter(payments::Column::DocumentId.eq(document_id.into_inner()))
        .order_by_asc(payments::Column::CreatedAt)
        .order_by_asc(payments::Column::Id)
        .all(conn)
        .await?)
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
    numbering: Arc<NumberingConfig>,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, numbering: Arc<NumberingConfig>) -> Self {
        Self { db, numbering }
    }

    /// Records a payment in its own transaction.
    pub async fn record(
        &self,
        input: PaymentInput,
        actor: Actor,
    ) -> Result<payments::Model, EngineError> {
        let numbering = Arc::clone(&self.numbering);
        let payment = with_transaction(&self.db, move |txn| {
            Box::pin(async move { record_in(txn, input, &numbering, &actor).await })
        })
        .await?;

        info!(
            payment_id = %payment.id,
            number = %payment.number,
            direction = %payment.direction,
            mode = %payment.mode,
            amount = %payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Deletes a payment and reverses its effects.
    pub async fn delete(&self, payment_id: PaymentId, actor: Actor) -> Result<(), EngineError> {
        with_transaction(&self.db, move |txn| {
            Box::pin(async move { delete_in(txn, payment_id, &actor).await })
        })
        .await?;

        info!(payment_id = %payment_id, "Payment deleted");
        Ok(())
    }

    /// Clears a pending cheque and books it on its account.
    ///
    /// The cheque's bank account receives the entry; without one it goes to
    /// the cash drawer.
    pub async fn clear_cheque(&self, cheque_id: ChequeId) -> Result<cheques::Model, EngineError> {
        let cheque = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let cheque = find_cheque(txn, cheque_id).await?;
                let to = cheque.status()?.transition(ChequeStatus::Cleared)?;
                let direction: PaymentDirection = cheque.direction()?;
                let payment = find_payment(txn, PaymentId::from(cheque.payment_id)).await?;

                let account =
                    LedgerAccount::from_column(cheque.bank_account_id.map(BankAccountId::from));
                let entry = cashbank::append(
                    txn,
                    account,
                    NewEntry {
                        date: cheque.date,
                        entry_type: direction.movement(account),
                        amount: direction.signed(cheque.amount),
                        description: format!("Cheque {} cleared", cheque.number),
                        party_id: cheque.party_id.map(PartyId::from),
                        document_id: payment.linked_document(),
                        payment_id: Some(payment.payment_id()),
                    },
                )
                .await?;

                let mut payment = payment.into_active_model();
                payment.ledger_entry_id = Set(Some(entry.id));
                payment.update(txn).await?;

                let mut active = cheque.into_active_model();
                active.status = Set(to.as_str().to_string());
                active.ledger_entry_id = Set(Some(entry.id));
                active.cleared_at = Set(Some(Utc::now()));
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(cheque_id = %cheque_id, number = %cheque.number, "Cheque cleared");
        Ok(cheque)
    }

    /// Marks a pending cheque as bounced and removes its payment.
    ///
    /// The cheque row stays as evidence.
    pub async fn bounce_cheque(
        &self,
        cheque_id: ChequeId,
        actor: Actor,
    ) -> Result<cheques::Model, EngineError> {
        let cheque = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let cheque = find_cheque(txn, cheque_id).await?;
                let to = cheque.status()?.transition(ChequeStatus::Bounced)?;
                let payment = find_payment(txn, PaymentId::from(cheque.payment_id)).await?;

                reverse_and_remove(txn, payment, &actor).await?;

                let mut active = cheque.into_active_model();
                active.status = Set(to.as_str().to_string());
                Ok(active.update(txn).await?)
            })
        })
        .await?;

        info!(cheque_id = %cheque_id, number = %cheque.number, "Cheque bounced");
        Ok(cheque)
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, payment_id: PaymentId) -> Result<payments::Model, EngineError> {
        find_payment(&self.db, payment_id).await
    }

    /// Payments linked to a document.
    pub async fn payments_for_document(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<payments::Model>, EngineError> {
        for_document(&self.db, document_id).await
    }

    /// Gets a cheque by ID.
    pub async fn get_cheque(&self, cheque_id: ChequeId) -> Result<cheques::Model, EngineError> {
        find_cheque(&self.db, cheque_id).await
    }

    /// The cheque issued for a payment, if any.
    pub async fn cheque_for_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Option<cheques::Model>, EngineError> {
        Ok(cheques::Entity::find()
            .filter(cheques::Column::PaymentId.eq(payment_id.into_inner()))
            .one(&self.db)
            .await?)
    }
}
