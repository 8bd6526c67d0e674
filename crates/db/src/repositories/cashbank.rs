//! Cash drawer and bank account ledger.
//!
//! One `ledger_entries` table holds every chain; `account_id` is null for
//! the cash drawer. Entries are ordered by `account_version`, which counts
//! creations per account and never changes.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, Select, Set,
};
use tallybook_core::cashbank::{
    CashBankError, ChainBreak, ChainLink, LedgerAccount, MovementType, RunningBalance,
    verify_chain,
};
use tallybook_shared::types::{BankAccountId, DocumentId, LedgerEntryId, PartyId, PaymentId};
use tracing::{debug, info, warn};

use crate::entities::{bank_accounts, ledger_entries};
use crate::error::EngineError;
use crate::tx::with_transaction;

/// Metadata of an entry about to be appended.
#[derive(Debug, Clone)]
pub struct NewEntry {
    /// Value date; editable and not used for ordering.
    pub date: NaiveDate,
    /// Movement type.
    pub entry_type: MovementType,
    /// Signed amount.
    pub amount: Decimal,
    /// Free-text description.
    pub description: String,
    /// Linked party.
    pub party_id: Option<PartyId>,
    /// Linked document.
    pub document_id: Option<DocumentId>,
    /// Linked payment.
    pub payment_id: Option<PaymentId>,
}

impl NewEntry {
    /// Entry without links.
    #[must_use]
    pub fn new(
        date: NaiveDate,
        entry_type: MovementType,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            entry_type,
            amount,
            description: description.into(),
            party_id: None,
            document_id: None,
            payment_id: None,
        }
    }
}

fn account_entries(account: LedgerAccount) -> Select<ledger_entries::Entity> {
    let query = ledger_entries::Entity::find();
    match account.bank_id() {
        Some(id) => query.filter(ledger_entries::Column::AccountId.eq(id.into_inner())),
        None => query.filter(ledger_entries::Column::AccountId.is_null()),
    }
}

async fn find_bank_account<C: ConnectionTrait>(
    conn: &C,
    id: BankAccountId,
) -> Result<bank_accounts::Model, EngineError> {
    bank_accounts::Entity::find_by_id(id.into_inner())
        .one(conn)
        .await?
        .ok_or(EngineError::BankAccountNotFound(id))
}

async fn shift_bank_balance<C: ConnectionTrait>(
    conn: &C,
    id: BankAccountId,
    delta: Decimal,
) -> Result<(), EngineError> {
    let account = find_bank_account(conn, id).await?;
    let new_balance = account.current_balance + delta;
    let mut active = account.into_active_model();
    active.current_balance = Set(new_balance);
    active.updated_at = Set(Utc::now());
    active.update(conn).await?;
    Ok(())
}

/// Appends an entry to the end of an account's chain.
pub async fn append<C: ConnectionTrait>(
    conn: &C,
    account: LedgerAccount,
    entry: NewEntry,
) -> Result<ledger_entries::Model, EngineError> {
    if let Some(id) = account.bank_id() {
        find_bank_account(conn, id).await?;
    }

    let latest = account_entries(account)
        .order_by_desc(ledger_entries::Column::AccountVersion)
        .one(conn)
        .await?
        .map(|m| RunningBalance {
            account_version: m.account_version,
            previous_balance: m.running_balance - m.amount,
            current_balance: m.running_balance,
        });
    let balance = RunningBalance::append(latest.as_ref(), entry.amount);

    let model = ledger_entries::ActiveModel {
        id: Set(LedgerEntryId::new().into_inner()),
        account_id: Set(account.bank_id().map(BankAccountId::into_inner)),
        account_version: Set(balance.account_version),
        date: Set(entry.date),
        entry_type: Set(entry.entry_type.as_str().to_string()),
        amount: Set(entry.amount),
        description: Set(entry.description),
        party_id: Set(entry.party_id.map(PartyId::into_inner)),
        document_id: Set(entry.document_id.map(DocumentId::into_inner)),
        payment_id: Set(entry.payment_id.map(PaymentId::into_inner)),
        running_balance: Set(balance.current_balance),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    if let Some(id) = account.bank_id() {
        shift_bank_balance(conn, id, entry.amount).await?;
    }

    debug!(
        account = %account,
        version = model.account_version,
        amount = %model.amount,
        running_balance = %model.running_balance,
        "Ledger entry appended"
    );
    Ok(model)
}

/// Deletes an entry and reverses the denormalized bank balance.
///
/// Running balances of later entries are left as stored.
pub async fn remove<C: ConnectionTrait>(
    conn: &C,
    entry_id: LedgerEntryId,
) -> Result<(), EngineError> {
    let entry = ledger_entries::Entity::find_by_id(entry_id.into_inner())
        .one(conn)
        .await?
        .ok_or(EngineError::LedgerEntryNotFound(entry_id))?;
    let account = entry.account();

    if let Some(id) = account.bank_id() {
        shift_bank_balance(conn, id, -entry.amount).await?;
    }
    ledger_entries::Entity::delete_by_id(entry.id)
        .exec(conn)
        .await?;

    debug!(account = %account, entry_id = %entry_id, amount = %entry.amount, "Ledger entry removed");
    Ok(())
}

/// Latest running balance of an account, zero when it has no entries.
pub async fn balance<C: ConnectionTrait>(
    conn: &C,
    account: LedgerAccount,
) -> Result<Decimal, EngineError> {
    Ok(account_entries(account)
        .order_by_desc(ledger_entries::Column::AccountVersion)
        .one(conn)
        .await?
        .map_or(Decimal::ZERO, |m| m.running_balance))
}

/// Input for a manual movement.
#[derive(Debug, Clone)]
pub struct MovementInput {
    /// Target account.
    pub account: LedgerAccount,
    /// Movement type; must fit the account.
    pub movement: MovementType,
    /// Unsigned amount, or signed for adjustments.
    pub amount: Decimal,
    /// Value date.
    pub date: NaiveDate,
    /// Description.
    pub description: String,
}

/// Input for a transfer between two accounts.
#[derive(Debug, Clone)]
pub struct TransferInput {
    /// Account debited.
    pub from: LedgerAccount,
    /// Account credited.
    pub to: LedgerAccount,
    /// Positive amount.
    pub amount: Decimal,
    /// Value date.
    pub date: NaiveDate,
    /// Description copied to both entries.
    pub description: String,
}

/// Cash and bank repository.
#[derive(Debug, Clone)]
pub struct CashBankRepository {
    db: DatabaseConnection,
}

impl CashBankRepository {
    /// Creates a new cash and bank repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a bank account with a zero balance.
    pub async fn create_bank_account(
        &self,
        id: BankAccountId,
        name: &str,
        account_number: Option<String>,
    ) -> Result<bank_accounts::Model, EngineError> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(CashBankError::BankAccountNameRequired.into());
        }

        let now = Utc::now();
        let account = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let account = bank_accounts::ActiveModel {
                    id: Set(id.into_inner()),
                    name: Set(name),
                    account_number: Set(account_number),
                    current_balance: Set(Decimal::ZERO),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                Ok(account.insert(txn).await?)
            })
        })
        .await?;

        info!(bank_account_id = %id, name = %account.name, "Bank account created");
        Ok(account)
    }

    /// Gets a bank account by ID.
    pub async fn get_bank_account(
        &self,
        id: BankAccountId,
    ) -> Result<bank_accounts::Model, EngineError> {
        find_bank_account(&self.db, id).await
    }

    /// Records a manual cash or bank movement.
    pub async fn record_movement(
        &self,
        input: MovementInput,
    ) -> Result<ledger_entries::Model, EngineError> {
        let signed = input.movement.signed_amount(input.account, input.amount)?;
        let entry = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                append(
                    txn,
                    input.account,
                    NewEntry::new(input.date, input.movement, signed, input.description),
                )
                .await
            })
        })
        .await?;

        info!(
            account = %entry.account(),
            entry_type = %entry.entry_type,
            amount = %entry.amount,
            "Movement recorded"
        );
        Ok(entry)
    }

    /// Moves money between two accounts. Returns the outgoing and incoming entries.
    pub async fn transfer(
        &self,
        input: TransferInput,
    ) -> Result<(ledger_entries::Model, ledger_entries::Model), EngineError> {
        if input.from == input.to {
            return Err(CashBankError::SameAccountTransfer(input.from).into());
        }
        if input.amount <= Decimal::ZERO {
            return Err(CashBankError::NonPositiveAmount(input.amount).into());
        }

        let TransferInput {
            from,
            to,
            amount,
            date,
            description,
        } = input;
        let entries = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let out = append(
                    txn,
                    from,
                    NewEntry::new(date, MovementType::Transfer, -amount, description.clone()),
                )
                .await?;
                let inc = append(
                    txn,
                    to,
                    NewEntry::new(date, MovementType::Transfer, amount, description),
                )
                .await?;
                Ok((out, inc))
            })
        })
        .await?;

        info!(from = %from, to = %to, %amount, "Transfer recorded");
        Ok(entries)
    }

    /// Entries of an account in creation order.
    pub async fn entries(
        &self,
        account: LedgerAccount,
    ) -> Result<Vec<ledger_entries::Model>, EngineError> {
        Ok(account_entries(account)
            .order_by_asc(ledger_entries::Column::AccountVersion)
            .all(&self.db)
            .await?)
    }

    /// Running balance of the cash drawer.
    pub async fn cash_balance(&self) -> Result<Decimal, EngineError> {
        balance(&self.db, LedgerAccount::Cash).await
    }

    /// Denormalized balance of a bank account.
    pub async fn bank_balance(&self, id: BankAccountId) -> Result<Decimal, EngineError> {
        Ok(find_bank_account(&self.db, id).await?.current_balance)
    }

    /// Reports the first entry whose stored running balance breaks the chain.
    pub async fn verify_chain(
        &self,
        account: LedgerAccount,
    ) -> Result<Option<ChainBreak>, EngineError> {
        let links: Vec<ChainLink> = self
            .entries(account)
            .await?
            .iter()
            .map(ledger_entries::Model::link)
            .collect();

        let result = verify_chain(&links);
        if let Some(brk) = &result {
            warn!(
                account = %account,
                version = brk.account_version,
                expected = %brk.expected,
                recorded = %brk.recorded,
                "Running balance chain is broken"
            );
        }
        Ok(result)
    }
}
