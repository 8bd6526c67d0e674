//! `SeaORM` Entity for cheques table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tallybook_core::payment::{ChequeStatus, PaymentDirection};

use crate::error::EngineError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cheques")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub number: String,
    /// Dangles once a bounced cheque's payment is removed.
    pub payment_id: Uuid,
    pub cheque_number: String,
    pub direction: String,
    pub amount: Decimal,
    pub bank_account_id: Option<Uuid>,
    pub party_id: Option<Uuid>,
    pub status: String,
    pub ledger_entry_id: Option<Uuid>,
    pub date: Date,
    pub cleared_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Decodes the `status` column.
    pub fn status(&self) -> Result<ChequeStatus, EngineError> {
        ChequeStatus::parse(&self.status)
            .ok_or_else(|| EngineError::corrupt("cheques", "status", &self.status))
    }

    /// Decodes the `direction` column.
    pub fn direction(&self) -> Result<PaymentDirection, EngineError> {
        PaymentDirection::parse(&self.direction)
            .ok_or_else(|| EngineError::corrupt("cheques", "direction", &self.direction))
    }
}
