//! Document mutation coordinator.
//!
//! Create, update and delete each run as one transaction that walks the
//! stock ledger, the numbering sequence, the party balance, the payment
//! recorder and the history log in a fixed order. Any failure rolls the
//! whole operation back.

use std::sync::Arc;

use chrono::{Local, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use serde::Serialize;
use tallybook_core::audit::{Actor, DocumentSnapshot, HistoryAction, describe_document};
use tallybook_core::document::{
    DocumentError, DocumentInput, DocumentService, DocumentStatus, PreparedLine,
};
use tallybook_core::party::BalanceEvent;
use tallybook_core::payment::{PaymentInput, PaymentMode};
use tallybook_core::workflow::StatusMachine;
use tallybook_shared::config::NumberingConfig;
use tallybook_shared::types::{DocumentId, LineItemId, PartyId, PaymentId, ProductId};
use tracing::{debug, info};

use super::{history, party, payment, sequence, stock};
use crate::entities::{documents, history_entries, line_items};
use crate::error::EngineError;
use crate::tx::with_transaction;

/// A document header with its lines in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentWithLines {
    /// Header row.
    pub document: documents::Model,
    /// Line rows ordered by position.
    pub lines: Vec<line_items::Model>,
}

impl DocumentWithLines {
    /// The stored document as a request that would recreate it.
    pub fn to_input(&self) -> Result<DocumentInput, EngineError> {
        Ok(DocumentInput {
            details: self.document.details()?,
            counterparty_id: self.document.party_id(),
            counterparty_name: self.document.counterparty_name.clone(),
            date: self.document.date,
            lines: self.lines.iter().map(line_items::Model::to_input).collect(),
            document_discount: self.document.document_discount,
            notes: self.document.notes.clone(),
            terms: self.document.terms.clone(),
        })
    }

    fn snapshot(&self) -> Result<DocumentSnapshot, EngineError> {
        let doc = &self.document;
        Ok(DocumentSnapshot {
            counterparty_id: doc.party_id(),
            counterparty_name: doc.counterparty_name.clone(),
            date: doc.date,
            details: doc.details()?,
            document_discount: doc.document_discount,
            subtotal: doc.subtotal,
            tax_amount: doc.tax_amount,
            discount_amount: doc.discount_amount,
            total: doc.total,
            amount_due: doc.amount_due,
            notes: doc.notes.clone(),
            terms: doc.terms.clone(),
            lines: self.lines.iter().map(line_items::Model::to_input).collect(),
            status: doc.status()?,
        })
    }
}

/// Payment taken together with a new document.
#[derive(Debug, Clone)]
pub struct InitialPayment {
    /// Caller-issued payment ID.
    pub payment_id: PaymentId,
    /// Positive amount.
    pub amount: Decimal,
    /// Cash, bank or cheque.
    pub mode: PaymentMode,
    /// Free-text reference.
    pub reference: Option<String>,
}

/// Request to create a document.
#[derive(Debug, Clone)]
pub struct CreateDocumentInput {
    /// Caller-issued ID.
    pub document_id: DocumentId,
    /// Document content.
    pub document: DocumentInput,
    /// Number supplied by the caller; allocated from the sequence when absent.
    pub number: Option<String>,
    /// Start in `draft` instead of the kind's open status.
    pub as_draft: bool,
    /// Payment recorded in the same transaction.
    pub initial_payment: Option<InitialPayment>,
    /// Who is creating the document.
    pub actor: Actor,
}

impl CreateDocumentInput {
    /// A non-draft document with an allocated number and no payment.
    #[must_use]
    pub fn new(document: DocumentInput, actor: Actor) -> Self {
        Self {
            document_id: DocumentId::new(),
            document,
            number: None,
            as_draft: false,
            initial_payment: None,
            actor,
        }
    }
}

/// Request to replace a document's content.
#[derive(Debug, Clone)]
pub struct UpdateDocumentInput {
    /// Document to update.
    pub document_id: DocumentId,
    /// New content; the kind must match.
    pub document: DocumentInput,
    /// Carry the total change (and a party change) to the party balances.
    pub rebalance_party: bool,
    /// Who is updating the document.
    pub actor: Actor,
}

pub(crate) async fn find_document<C: ConnectionTrait>(
    conn: &C,
    document_id: DocumentId,
) -> Result<documents::Model, EngineError> {
    documents::Entity::find_by_id(document_id.into_inner())
        .one(conn)
        .await?
        .ok_or(EngineError::DocumentNotFound(document_id))
}

async fn find_lines<C: ConnectionTrait>(
    conn: &C,
    document_id: DocumentId,
) -> Result<Vec<line_items::Model>, EngineError> {
    Ok(line_items::Entity::find()
        .filter(line_items::Column::DocumentId.eq(document_id.into_inner()))
        .order_by_asc(line_items::Column::Position)
        .all(conn)
        .await?)
}

/// Loads a document with its lines.
pub async fn load<C: ConnectionTrait>(
    conn: &C,
    document_id: DocumentId,
) -> Result<DocumentWithLines, EngineError> {
    let document = find_document(conn, document_id).await?;
    let lines = find_lines(conn, document_id).await?;
    Ok(DocumentWithLines { document, lines })
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    document_id: DocumentId,
    lines: &[PreparedLine],
) -> Result<(), EngineError> {
    for line in lines {
        line_items::ActiveModel {
            id: Set(LineItemId::new().into_inner()),
            document_id: Set(document_id.into_inner()),
            product_id: Set(line.input.product_id.map(ProductId::into_inner)),
            name: Set(line.input.name.clone()),
            quantity: Set(line.input.quantity),
            unit: Set(line.input.unit.clone()),
            unit_price: Set(line.input.unit_price),
            discount_percent: Set(line.input.discount_percent),
            tax_percent: Set(line.input.tax_percent),
            amount: Set(line.amounts.amount),
            position: Set(line.position),
        }
        .insert(conn)
        .await?;
    }
    Ok(())
}

/// Creates a document inside the caller's transaction.
pub async fn create_in<C: ConnectionTrait>(
    conn: &C,
    input: CreateDocumentInput,
    numbering: &NumberingConfig,
    today: NaiveDate,
) -> Result<DocumentWithLines, EngineError> {
    let CreateDocumentInput {
        document_id,
        document,
        number,
        as_draft,
        initial_payment,
        actor,
    } = input;
    let kind = document.kind();

    let prepared = DocumentService::prepare(&document)?;

    if let Some(direction) = kind.stock_direction() {
        let lines = DocumentService::stock_lines(&document.lines);
        stock::reserve(conn, direction, &lines, today).await?;
    }

    let number = match number {
        Some(number) => number,
        None => sequence::next_number(conn, kind.sequence(), numbering).await?,
    };

    let totals = prepared.totals;
    let columns = document.details.columns();
    let now = Utc::now();
    documents::ActiveModel {
        id: Set(document_id.into_inner()),
        kind: Set(kind.as_str().to_string()),
        number: Set(number.clone()),
        counterparty_id: Set(document.counterparty_id.map(PartyId::into_inner)),
        counterparty_name: Set(document.counterparty_name.clone()),
        date: Set(document.date),
        due_date: Set(columns.due_date),
        supplier_reference: Set(columns.supplier_reference),
        against_invoice_id: Set(columns.against_invoice.map(DocumentId::into_inner)),
        reason: Set(columns.reason),
        category: Set(columns.category),
        converted_to: Set(None),
        status: Set(StatusMachine::initial_status(kind, as_draft).as_str().to_string()),
        subtotal: Set(totals.subtotal),
        tax_amount: Set(totals.tax_amount),
        discount_amount: Set(totals.discount_amount),
        document_discount: Set(document.document_discount),
        total: Set(totals.total),
        amount_paid: Set(Decimal::ZERO),
        amount_due: Set(totals.amount_due(Decimal::ZERO)),
        notes: Set(document.notes.clone()),
        terms: Set(document.terms.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    insert_lines(conn, document_id, &prepared.lines).await?;

    party::apply_event(
        conn,
        document.counterparty_id,
        kind.balance_side(),
        BalanceEvent::Created {
            total: totals.total,
        },
    )
    .await?;

    history::append(
        conn,
        document_id,
        HistoryAction::Created,
        describe_document(HistoryAction::Created, kind, &number),
        &[],
        &actor,
    )
    .await?;

    if let Some(initial) = initial_payment {
        let payment = PaymentInput {
            payment_id: initial.payment_id,
            document_id: Some(document_id),
            party_id: None,
            direction: None,
            amount: initial.amount,
            mode: initial.mode,
            reference: initial.reference,
            date: document.date,
        };
        payment::record_in(conn, payment, numbering, &actor).await?;
    }

    debug!(document_id = %document_id, number = %number, total = %totals.total, "Document written");
    load(conn, document_id).await
}

/// Replaces a document's content inside the caller's transaction.
pub async fn update_in<C: ConnectionTrait>(
    conn: &C,
    input: UpdateDocumentInput,
    today: NaiveDate,
) -> Result<DocumentWithLines, EngineError> {
    let UpdateDocumentInput {
        document_id,
        document,
        rebalance_party,
        actor,
    } = input;

    let old = load(conn, document_id).await?;
    let kind = old.document.kind()?;
    if document.kind() != kind {
        return Err(DocumentError::KindMismatch {
            existing: kind,
            requested: document.kind(),
        }
        .into());
    }
    let old_status = old.document.status()?;
    StatusMachine::ensure_editable(old_status)?;

    let prepared = DocumentService::prepare(&document)?;

    if let Some(direction) = kind.stock_direction() {
        let old_lines: Vec<_> = old.lines.iter().map(line_items::Model::to_input).collect();
        stock::release(conn, direction, &DocumentService::stock_lines(&old_lines)).await?;
        let new_lines = DocumentService::stock_lines(&document.lines);
        stock::reserve(conn, direction, &new_lines, today).await?;
    }

    let old_snapshot = old.snapshot()?;
    let old_party = old.document.party_id();
    let old_total = old.document.total;
    let amount_paid = old.document.amount_paid;
    let number = old.document.number.clone();
    let totals = prepared.totals;
    let columns = document.details.columns();
    let amount_due = totals.amount_due(amount_paid);
    let revision = StatusMachine::after_revision(
        kind,
        old_status,
        amount_paid,
        amount_due <= Decimal::ZERO,
    );

    let mut active = old.document.into_active_model();
    active.counterparty_id = Set(document.counterparty_id.map(PartyId::into_inner));
    active.counterparty_name = Set(document.counterparty_name.clone());
    active.date = Set(document.date);
    active.due_date = Set(columns.due_date);
    active.supplier_reference = Set(columns.supplier_reference);
    active.against_invoice_id = Set(columns.against_invoice.map(DocumentId::into_inner));
    active.reason = Set(columns.reason);
    active.category = Set(columns.category);
    active.subtotal = Set(totals.subtotal);
    active.tax_amount = Set(totals.tax_amount);
    active.discount_amount = Set(totals.discount_amount);
    active.document_discount = Set(document.document_discount);
    active.total = Set(totals.total);
    active.notes = Set(document.notes.clone());
    active.terms = Set(document.terms.clone());
    active.updated_at = Set(Utc::now());
    active.amount_due = Set(amount_due);
    if let Some(effect) = revision {
        active.status = Set(effect.to.as_str().to_string());
    }
    active.update(conn).await?;

    line_items::Entity::delete_many()
        .filter(line_items::Column::DocumentId.eq(document_id.into_inner()))
        .exec(conn)
        .await?;
    insert_lines(conn, document_id, &prepared.lines).await?;

    if rebalance_party {
        let side = kind.balance_side();
        let new_party = document.counterparty_id;
        if old_party == new_party {
            party::apply_event(
                conn,
                new_party,
                side,
                BalanceEvent::TotalRevised {
                    old: old_total,
                    new: totals.total,
                },
            )
            .await?;
        } else {
            party::apply_event(conn, old_party, side, BalanceEvent::Deleted { total: old_total })
                .await?;
            party::apply_event(
                conn,
                new_party,
                side,
                BalanceEvent::Created {
                    total: totals.total,
                },
            )
            .await?;
        }
    }

    let updated = load(conn, document_id).await?;
    let changes = old_snapshot.diff(&updated.snapshot()?);
    if !changes.is_empty() {
        history::append(
            conn,
            document_id,
            HistoryAction::Updated,
            describe_document(HistoryAction::Updated, kind, &number),
            &changes,
            &actor,
        )
        .await?;
    }

    debug!(
        document_id = %document_id,
        changes = changes.len(),
        rebalance_party,
        status_changed = revision.is_some(),
        "Document rewritten"
    );
    Ok(updated)
}

/// Deletes a document inside the caller's transaction, reversing every effect.
pub async fn delete_in<C: ConnectionTrait>(
    conn: &C,
    document_id: DocumentId,
    actor: &Actor,
) -> Result<(), EngineError> {
    for linked in payment::for_document(conn, document_id).await? {
        payment::delete_in(conn, linked.payment_id(), actor).await?;
    }

    let doc = load(conn, document_id).await?;
    let kind = doc.document.kind()?;
    let status = doc.document.status()?;

    if let Some(direction) = kind.stock_direction() {
        let lines: Vec<_> = doc.lines.iter().map(line_items::Model::to_input).collect();
        stock::release(conn, direction, &DocumentService::stock_lines(&lines)).await?;
    }

    // A returned document already gave its total back to the party.
    if status != DocumentStatus::Returned {
        party::apply_event(
            conn,
            doc.document.party_id(),
            kind.balance_side(),
            BalanceEvent::Deleted {
                total: doc.document.total,
            },
        )
        .await?;
    }

    line_items::Entity::delete_many()
        .filter(line_items::Column::DocumentId.eq(document_id.into_inner()))
        .exec(conn)
        .await?;
    documents::Entity::delete_by_id(document_id.into_inner())
        .exec(conn)
        .await?;

    history::append(
        conn,
        document_id,
        HistoryAction::Deleted,
        describe_document(HistoryAction::Deleted, kind, &doc.document.number),
        &[],
        actor,
    )
    .await?;

    Ok(())
}

/// Date used for expiry checks.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Document repository.
#[derive(Debug, Clone)]
pub struct DocumentRepository {
    db: DatabaseConnection,
    numbering: Arc<NumberingConfig>,
}

impl DocumentRepository {
    /// Creates a new document repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, numbering: Arc<NumberingConfig>) -> Self {
        Self { db, numbering }
    }

    /// Creates a document and applies its stock, balance and payment effects.
    pub async fn create(
        &self,
        input: CreateDocumentInput,
    ) -> Result<DocumentWithLines, EngineError> {
        let numbering = Arc::clone(&self.numbering);
        let today = today();
        let created = with_transaction(&self.db, move |txn| {
            Box::pin(async move { create_in(txn, input, &numbering, today).await })
        })
        .await?;

        info!(
            document_id = %created.document.id,
            kind = %created.document.kind,
            number = %created.document.number,
            total = %created.document.total,
            "Document created"
        );
        Ok(created)
    }

    /// Replaces a document's content.
    pub async fn update(
        &self,
        input: UpdateDocumentInput,
    ) -> Result<DocumentWithLines, EngineError> {
        let today = today();
        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move { update_in(txn, input, today).await })
        })
        .await?;

        info!(
            document_id = %updated.document.id,
            number = %updated.document.number,
            total = %updated.document.total,
            "Document updated"
        );
        Ok(updated)
    }

    /// Deletes a document and everything it caused.
    pub async fn delete(&self, document_id: DocumentId, actor: Actor) -> Result<(), EngineError> {
        with_transaction(&self.db, move |txn| {
            Box::pin(async move { delete_in(txn, document_id, &actor).await })
        })
        .await?;

        info!(document_id = %document_id, "Document deleted");
        Ok(())
    }

    /// Gets a document with its lines.
    pub async fn get(&self, document_id: DocumentId) -> Result<DocumentWithLines, EngineError> {
        load(&self.db, document_id).await
    }

    /// History of a document, oldest first.
    pub async fn history(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<history_entries::Model>, EngineError> {
        history::for_document(&self.db, document_id).await
    }
}
