//! `SeaORM` Entity for ledger_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tallybook_core::cashbank::{ChainLink, LedgerAccount};
use tallybook_shared::types::BankAccountId;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// `None` for the cash drawer.
    pub account_id: Option<Uuid>,
    pub account_version: i64,
    pub date: Date,
    pub entry_type: String,
    pub amount: Decimal,
    pub description: String,
    pub party_id: Option<Uuid>,
    pub document_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub running_balance: Decimal,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::AccountId",
        to = "super::bank_accounts::Column::Id"
    )]
    BankAccounts,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The account the entry belongs to.
    #[must_use]
    pub fn account(&self) -> LedgerAccount {
        LedgerAccount::from_column(self.account_id.map(BankAccountId::from))
    }

    /// Fields used by the chain audit.
    #[must_use]
    pub fn link(&self) -> ChainLink {
        ChainLink {
            entry_id: self.id.into(),
            account_version: self.account_version,
            amount: self.amount,
            running_balance: self.running_balance,
        }
    }
}
