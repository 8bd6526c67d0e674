//! Document conversion.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, IntoActiveModel, Set};
use tallybook_core::audit::{Actor, DocumentField, FieldChange, HistoryAction, describe_conversion};
use tallybook_core::conversion::ConversionService;
use tallybook_core::document::DocumentKind;
use tallybook_core::workflow::StatusMachine;
use tallybook_shared::config::NumberingConfig;
use tallybook_shared::types::DocumentId;
use tracing::info;

use super::document::{self, CreateDocumentInput, DocumentWithLines, today};
use super::{history, status};
use crate::error::EngineError;
use crate::tx::with_transaction;

/// Request to convert a document into another kind.
#[derive(Debug, Clone)]
pub struct ConvertInput {
    /// Document being converted.
    pub source_id: DocumentId,
    /// Kind of the new document.
    pub target_kind: DocumentKind,
    /// Caller-issued ID of the new document.
    pub target_id: DocumentId,
    /// Date of the new document.
    pub date: NaiveDate,
    /// Due date of the new document.
    pub due_date: Option<NaiveDate>,
    /// Who is converting.
    pub actor: Actor,
}

/// Converts a document inside the caller's transaction.
///
/// The target goes through the full create path; the source only changes
/// status and gains a back-reference.
pub async fn convert_in<C: ConnectionTrait>(
    conn: &C,
    input: ConvertInput,
    numbering: &NumberingConfig,
    today: NaiveDate,
) -> Result<DocumentWithLines, EngineError> {
    let source = document::load(conn, input.source_id).await?;
    let source_kind = source.document.kind()?;
    let source_status = source.document.status()?;

    let route = ConversionService::route(source_kind, input.target_kind)?;
    ConversionService::check_source(source_kind, source_status)?;
    let effect = StatusMachine::validate_conversion(source_kind, source_status)?;

    let target_input =
        ConversionService::target_input(route, &source.to_input()?, input.date, input.due_date);
    let mut create = CreateDocumentInput::new(target_input, input.actor.clone());
    create.document_id = input.target_id;
    let target = document::create_in(conn, create, numbering, today).await?;

    let source_number = source.document.number.clone();
    let mut active = source.document.into_active_model();
    active.converted_to = Set(Some(input.target_id.into_inner()));
    active.updated_at = Set(Utc::now());
    let stamped = active.update(conn).await?;

    status::apply_effect(conn, stamped, effect, &input.actor).await?;

    history::append(
        conn,
        input.source_id,
        HistoryAction::Converted,
        describe_conversion(&source_number, input.target_kind, &target.document.number),
        &[FieldChange {
            field: DocumentField::ConvertedTo,
            old: None::<DocumentId>.into(),
            new: Some(input.target_id).into(),
        }],
        &input.actor,
    )
    .await?;

    Ok(target)
}

/// Conversion repository.
#[derive(Debug, Clone)]
pub struct ConversionRepository {
    db: DatabaseConnection,
    numbering: Arc<NumberingConfig>,
}

impl ConversionRepository {
    /// Creates a new conversion repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, numbering: Arc<NumberingConfig>) -> Self {
        Self { db, numbering }
    }

    /// Converts a document and returns the new one.
    pub async fn convert(&self, input: ConvertInput) -> Result<DocumentWithLines, EngineError> {
        let numbering = Arc::clone(&self.numbering);
        let today = today();
        let source_id = input.source_id;
        let target = with_transaction(&self.db, move |txn| {
            Box::pin(async move { convert_in(txn, input, &numbering, today).await })
        })
        .await?;

        info!(
            source_id = %source_id,
            target_id = %target.document.id,
            number = %target.document.number,
            "Document converted"
        );
        Ok(target)
    }
}
