//! Sequence allocator.
//!
//! Counters live in `sequence_counters`, one row per kind, created lazily
//! with the kind's seed on first use. Allocation runs inside the caller's
//! transaction so an aborted operation rolls the increment back.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set};
use tallybook_core::sequence::{SequenceKind, SequenceState};
use tallybook_shared::config::NumberingConfig;
use tracing::debug;

use crate::entities::sequence_counters;
use crate::error::EngineError;
use crate::tx::with_transaction;

/// Reads the counter for `kind`, inserting its seed when absent.
async fn load_or_seed<C: ConnectionTrait>(
    conn: &C,
    kind: SequenceKind,
    numbering: &NumberingConfig,
) -> Result<sequence_counters::Model, EngineError> {
    if let Some(counter) = sequence_counters::Entity::find_by_id(kind.as_str().to_string())
        .one(conn)
        .await?
    {
        return Ok(counter);
    }

    let seed = kind.seed(numbering);
    let padding = i32::try_from(seed.padding)
        .map_err(|_| EngineError::UnseedableCounter(kind.to_string()))?;
    if seed.prefix.trim().is_empty() || seed.start < 0 {
        return Err(EngineError::UnseedableCounter(kind.to_string()));
    }

    debug!(kind = %kind, prefix = %seed.prefix, start = seed.start, "Seeding sequence counter");
    let counter = sequence_counters::ActiveModel {
        kind: Set(kind.as_str().to_string()),
        prefix: Set(seed.prefix),
        next_number: Set(seed.start),
        padding: Set(padding),
        updated_at: Set(Utc::now()),
    };
    Ok(counter.insert(conn).await?)
}

/// Allocates the next number of `kind` inside the enclosing transaction.
pub async fn next_number<C: ConnectionTrait>(
    conn: &C,
    kind: SequenceKind,
    numbering: &NumberingConfig,
) -> Result<String, EngineError> {
    let counter = load_or_seed(conn, kind, numbering).await?;
    let mut state = counter.state();
    let number = state.allocate();

    let mut active: sequence_counters::ActiveModel = counter.into();
    active.next_number = Set(state.next_number);
    active.updated_at = Set(Utc::now());
    active.update(conn).await?;

    debug!(kind = %kind, number = %number, "Allocated number");
    Ok(number)
}

/// Returns what the next allocation of `kind` would produce.
pub async fn peek_number<C: ConnectionTrait>(
    conn: &C,
    kind: SequenceKind,
    numbering: &NumberingConfig,
) -> Result<String, EngineError> {
    let state = match sequence_counters::Entity::find_by_id(kind.as_str().to_string())
        .one(conn)
        .await?
    {
        Some(counter) => counter.state(),
        None => SequenceState::seeded(&kind.seed(numbering)),
    };
    Ok(state.peek())
}

/// Sequence repository.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
    numbering: Arc<NumberingConfig>,
}

impl SequenceRepository {
    /// Creates a new sequence repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, numbering: Arc<NumberingConfig>) -> Self {
        Self { db, numbering }
    }

    /// Peeks at the next number without consuming it.
    pub async fn peek_number(&self, kind: SequenceKind) -> Result<String, EngineError> {
        peek_number(&self.db, kind, &self.numbering).await
    }

    /// Allocates a number in its own transaction.
    pub async fn next_number(&self, kind: SequenceKind) -> Result<String, EngineError> {
        let numbering = Arc::clone(&self.numbering);
        with_transaction(&self.db, move |txn| {
            Box::pin(async move { next_number(txn, kind, &numbering).await })
        })
        .await
    }
}
