//! Append-only document history.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tallybook_core::audit::{Actor, FieldChange, HistoryAction};
use tallybook_shared::types::{DocumentId, HistoryEntryId, UserId};
use tracing::debug;

use crate::entities::history_entries;
use crate::error::EngineError;

/// Appends one history row inside the caller's transaction.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    document_id: DocumentId,
    action: HistoryAction,
    description: String,
    changes: &[FieldChange],
    actor: &Actor,
) -> Result<history_entries::Model, EngineError> {
    let entry = history_entries::ActiveModel {
        id: Set(HistoryEntryId::new().into_inner()),
        document_id: Set(document_id.into_inner()),
        action: Set(action.as_str().to_string()),
        description: Set(description),
        changes: Set(serde_json::to_string(changes)?),
        actor_id: Set(actor.id.map(UserId::into_inner)),
        actor_name: Set(actor.name.clone()),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    debug!(
        document_id = %document_id,
        action = %action,
        changes = changes.len(),
        "History entry written"
    );
    Ok(entry)
}

/// History rows of a document, oldest first.
pub async fn for_document<C: ConnectionTrait>(
    conn: &C,
    document_id: DocumentId,
) -> Result<Vec<history_entries::Model>, EngineError> {
    Ok(history_entries::Entity::find()
        .filter(history_entries::Column::DocumentId.eq(document_id.into_inner()))
        .order_by_asc(history_entries::Column::CreatedAt)
        .order_by_asc(history_entries::Column::Id)
        .all(conn)
        .await?)
}

/// Read access to document history.
#[derive(Debug, Clone)]
pub struct HistoryRepository {
    db: DatabaseConnection,
}

impl HistoryRepository {
    /// Creates a new history repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// History of a document, oldest first. Rows survive the document.
    pub async fn for_document(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<history_entries::Model>, EngineError> {
        for_document(&self.db, document_id).await
    }
}
