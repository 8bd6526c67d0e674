//! `SeaORM` Entity for sequence_counters table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tallybook_core::sequence::SequenceState;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sequence_counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub kind: String,
    pub prefix: String,
    pub next_number: i64,
    pub padding: i32,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Counter state.
    #[must_use]
    pub fn state(&self) -> SequenceState {
        SequenceState {
            prefix: self.prefix.clone(),
            next_number: self.next_number,
            padding: u32::try_from(self.padding).unwrap_or(0),
        }
    }
}
