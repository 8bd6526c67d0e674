//! Status transitions and the overdue sweep.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Set,
};
use tallybook_core::audit::{Actor, FieldChange, HistoryAction, describe_status};
use tallybook_core::document::DocumentStatus;
use tallybook_core::party::BalanceEvent;
use tallybook_core::workflow::{StatusEffect, StatusMachine};
use tallybook_shared::types::DocumentId;
use tracing::{debug, info};

use super::document::find_document;
use super::{history, party};
use crate::entities::documents;
use crate::error::EngineError;
use crate::tx::with_transaction;

/// Writes a validated status change and its `status_changed` history row.
pub(crate) async fn apply_effect<C: ConnectionTrait>(
    conn: &C,
    document: documents::Model,
    effect: StatusEffect,
    actor: &Actor,
) -> Result<documents::Model, EngineError> {
    let document_id = document.document_id();
    let description = describe_status(&document.number, effect.from, effect.to);

    if effect.reverse_balance {
        party::apply_event(
            conn,
            document.party_id(),
            document.kind()?.balance_side(),
            BalanceEvent::Returned {
                total: document.total,
            },
        )
        .await?;
    }

    let mut active = document.into_active_model();
    active.status = Set(effect.to.as_str().to_string());
    active.updated_at = Set(Utc::now());
    let updated = active.update(conn).await?;

    history::append(
        conn,
        document_id,
        HistoryAction::StatusChanged,
        description,
        &[FieldChange::status(effect.from, effect.to)],
        actor,
    )
    .await?;

    debug!(
        document_id = %document_id,
        from = %effect.from,
        to = %effect.to,
        cause = ?effect.cause,
        "Status changed"
    );
    Ok(updated)
}

/// Applies a user-requested transition inside the caller's transaction.
pub async fn transition_in<C: ConnectionTrait>(
    conn: &C,
    document_id: DocumentId,
    to: DocumentStatus,
    actor: &Actor,
) -> Result<documents::Model, EngineError> {
    let document = find_document(conn, document_id).await?;
    let effect = StatusMachine::validate_manual(document.kind()?, document.status()?, to)?;
    apply_effect(conn, document, effect, actor).await
}

/// Moves open invoices due before `as_of` to `overdue`. Returns the moved IDs.
pub async fn mark_overdue_in<C: ConnectionTrait>(
    conn: &C,
    as_of: NaiveDate,
    actor: &Actor,
) -> Result<Vec<DocumentId>, EngineError> {
    let candidates = documents::Entity::find()
        .filter(documents::Column::Status.is_in([
            DocumentStatus::Unpaid.as_str(),
            DocumentStatus::Partial.as_str(),
        ]))
        .filter(documents::Column::DueDate.lt(as_of))
        .order_by_asc(documents::Column::Number)
        .all(conn)
        .await?;

    let mut moved = Vec::new();
    for document in candidates {
        let status = document.status()?;
        if !StatusMachine::is_overdue(document.kind()?, status, document.due_date, as_of) {
            continue;
        }
        let id = document.document_id();
        apply_effect(conn, document, StatusMachine::overdue_effect(status), actor).await?;
        moved.push(id);
    }
    Ok(moved)
}

/// Status repository.
#[derive(Debug, Clone)]
pub struct StatusRepository {
    db: DatabaseConnection,
}

impl StatusRepository {
    /// Creates a new status repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Moves a document to `to`, applying the transition's side effects.
    pub async fn transition(
        &self,
        document_id: DocumentId,
        to: DocumentStatus,
        actor: Actor,
    ) -> Result<documents::Model, EngineError> {
        let document = with_transaction(&self.db, move |txn| {
            Box::pin(async move { transition_in(txn, document_id, to, &actor).await })
        })
        .await?;

        info!(document_id = %document_id, number = %document.number, status = %to, "Document status changed");
        Ok(document)
    }

    /// Sweeps overdue invoices in one transaction.
    pub async fn mark_overdue(
        &self,
        as_of: NaiveDate,
        actor: Actor,
    ) -> Result<Vec<DocumentId>, EngineError> {
        let moved = with_transaction(&self.db, move |txn| {
            Box::pin(async move { mark_overdue_in(txn, as_of, &actor).await })
        })
        .await?;

        info!(%as_of, count = moved.len(), "Overdue sweep finished");
        Ok(moved)
    }
}
