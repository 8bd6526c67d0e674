//! `SeaORM` Entity for history_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tallybook_core::audit::{FieldChange, HistoryAction};

use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "history_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Not a foreign key; rows outlive their document.
    pub document_id: Uuid,
    pub action: String,
    pub description: String,
    /// JSON array of field changes.
    pub changes: String,
    pub actor_id: Option<Uuid>,
    pub actor_name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decodes the `action` column.
    pub fn action(&self) -> Result<HistoryAction, EngineError> {
        HistoryAction::parse(&self.action)
            .ok_or_else(|| EngineError::corrupt("history_entries", "action", &self.action))
    }

    /// Decodes the recorded field changes.
    pub fn changes(&self) -> Result<Vec<FieldChange>, EngineError> {
        Ok(serde_json::from_str(&self.changes)?)
    }
}
