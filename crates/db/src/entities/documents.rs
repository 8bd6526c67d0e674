//! `SeaORM` Entity for documents table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tallybook_core::document::{DetailColumns, DocumentKind, DocumentStatus, KindDetails};
use tallybook_shared::types::{DocumentId, PartyId};

use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "documents")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: String,
    #[sea_orm(unique)]
    pub number: String,
    pub counterparty_id: Option<Uuid>,
    pub counterparty_name: String,
    pub date: Date,
    pub due_date: Option<Date>,
    pub supplier_reference: Option<String>,
    pub against_invoice_id: Option<Uuid>,
    pub reason: Option<String>,
    pub category: Option<String>,
    pub converted_to: Option<Uuid>,
    pub status: String,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub discount_amount: Decimal,
    pub document_discount: Decimal,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub amount_due: Decimal,
    pub notes: Option<String>,
    pub terms: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::line_items::Entity")]
    LineItems,
}

impl Related<super::line_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LineItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Typed document ID.
    #[must_use]
    pub fn document_id(&self) -> DocumentId {
        self.id.into()
    }

    /// Typed counterparty ID.
    #[must_use]
    pub fn party_id(&self) -> Option<PartyId> {
        self.counterparty_id.map(PartyId::from)
    }

    /// Decodes the `kind` column.
    pub fn kind(&self) -> Result<DocumentKind, EngineError> {
        DocumentKind::parse(&self.kind)
            .ok_or_else(|| EngineError::corrupt("documents", "kind", &self.kind))
    }

    /// Decodes the `status` column.
    pub fn status(&self) -> Result<DocumentStatus, EngineError> {
        DocumentStatus::parse(&self.status)
            .ok_or_else(|| EngineError::corrupt("documents", "status", &self.status))
    }

    /// Rebuilds the kind-specific details.
    pub fn details(&self) -> Result<KindDetails, EngineError> {
        Ok(KindDetails::from_columns(
            self.kind()?,
            DetailColumns {
                due_date: self.due_date,
                supplier_reference: self.supplier_reference.clone(),
                against_invoice: self.against_invoice_id.map(DocumentId::from),
                reason: self.reason.clone(),
                category: self.category.clone(),
            },
        ))
    }
}
