//! `SeaORM` Entity for payments table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tallybook_core::payment::PaymentDirection;
use tallybook_shared::types::{DocumentId, PaymentId};

use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    pub direction: String,
    pub document_id: Option<Uuid>,
    pub party_id: Option<Uuid>,
    pub amount: Decimal,
    pub mode: String,
    pub bank_account_id: Option<Uuid>,
    pub reference: Option<String>,
    pub date: Date,
    pub ledger_entry_id: Option<Uuid>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Typed payment ID.
    #[must_use]
    pub fn payment_id(&self) -> PaymentId {
        self.id.into()
    }

    /// Typed document ID.
    #[must_use]
    pub fn linked_document(&self) -> Option<DocumentId> {
        self.document_id.map(DocumentId::from)
    }

    /// Decodes the `direction` column.
    pub fn direction(&self) -> Result<PaymentDirection, EngineError> {
        PaymentDirection::parse(&self.direction)
            .ok_or_else(|| EngineError::corrupt("payments", "direction", &self.direction))
    }
}
