//! Initial database migration.
//!
//! Creates every table of the local book. Money and quantity columns are
//! declared REAL so SQLite stores them with one storage class; UUIDs are
//! BLOBs and dates are ISO-8601 text.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: MASTER DATA
        // ============================================================
        db.execute_unprepared(PARTIES_SQL).await?;
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(BANK_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 2: NUMBERING
        // ============================================================
        db.execute_unprepared(SEQUENCE_COUNTERS_SQL).await?;

        // ============================================================
        // PART 3: DOCUMENTS
        // ============================================================
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(LINE_ITEMS_SQL).await?;

        // ============================================================
        // PART 4: CASH & BANK LEDGER
        // ============================================================
        db.execute_unprepared(LEDGER_ENTRIES_SQL).await?;

        // ============================================================
        // PART 5: PAYMENTS & CHEQUES
        // ============================================================
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(CHEQUES_SQL).await?;

        // ============================================================
        // PART 6: AUDIT TRAIL
        // ============================================================
        db.execute_unprepared(HISTORY_ENTRIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const PARTIES_SQL: &str = r"
CREATE TABLE parties (
    id BLOB PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    current_balance REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX idx_parties_name ON parties(name);
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id BLOB PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    is_service BOOLEAN NOT NULL DEFAULT 0,
    quantity REAL NOT NULL DEFAULT 0,
    expiry_date TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CONSTRAINT chk_products_quantity CHECK (is_service = 1 OR quantity >= 0)
);
";

const BANK_ACCOUNTS_SQL: &str = r"
CREATE TABLE bank_accounts (
    id BLOB PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    account_number TEXT,
    current_balance REAL NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

const SEQUENCE_COUNTERS_SQL: &str = r"
CREATE TABLE sequence_counters (
    kind TEXT PRIMARY KEY NOT NULL,
    prefix TEXT NOT NULL,
    next_number INTEGER NOT NULL,
    padding INTEGER NOT NULL DEFAULT 4,
    updated_at TEXT NOT NULL,
    CONSTRAINT chk_sequence_kind CHECK (kind IN (
        'sale_invoice', 'purchase_invoice', 'estimate', 'credit_note',
        'payment_in', 'payment_out', 'expense', 'cheque'
    ))
);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id BLOB PRIMARY KEY NOT NULL,
    kind TEXT NOT NULL,
    number TEXT NOT NULL UNIQUE,
    counterparty_id BLOB,
    counterparty_name TEXT NOT NULL,
    date TEXT NOT NULL,
    due_date TEXT,
    supplier_reference TEXT,
    against_invoice_id BLOB,
    reason TEXT,
    category TEXT,
    converted_to BLOB,
    status TEXT NOT NULL,
    subtotal REAL NOT NULL DEFAULT 0,
    tax_amount REAL NOT NULL DEFAULT 0,
    discount_amount REAL NOT NULL DEFAULT 0,
    document_discount REAL NOT NULL DEFAULT 0,
    total REAL NOT NULL DEFAULT 0,
    amount_paid REAL NOT NULL DEFAULT 0,
    amount_due REAL NOT NULL DEFAULT 0,
    notes TEXT,
    terms TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    CONSTRAINT chk_documents_kind CHECK (kind IN (
        'sale_invoice', 'purchase_invoice', 'estimate', 'credit_note', 'expense'
    ))
);

CREATE INDEX idx_documents_kind_status ON documents(kind, status);
CREATE INDEX idx_documents_counterparty ON documents(counterparty_id);
CREATE INDEX idx_documents_due_date ON documents(due_date);
";

const LINE_ITEMS_SQL: &str = r"
CREATE TABLE line_items (
    id BLOB PRIMARY KEY NOT NULL,
    document_id BLOB NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    product_id BLOB,
    name TEXT NOT NULL,
    quantity REAL NOT NULL,
    unit TEXT NOT NULL,
    unit_price REAL NOT NULL,
    discount_percent REAL NOT NULL DEFAULT 0,
    tax_percent REAL NOT NULL DEFAULT 0,
    amount REAL NOT NULL,
    position INTEGER NOT NULL,
    CONSTRAINT chk_line_items_quantity CHECK (quantity > 0)
);

CREATE INDEX idx_line_items_document ON line_items(document_id, position);
CREATE INDEX idx_line_items_product ON line_items(product_id);
";

const LEDGER_ENTRIES_SQL: &str = r"
CREATE TABLE ledger_entries (
    id BLOB PRIMARY KEY NOT NULL,
    account_id BLOB REFERENCES bank_accounts(id),
    account_version INTEGER NOT NULL,
    date TEXT NOT NULL,
    entry_type TEXT NOT NULL,
    amount REAL NOT NULL,
    description TEXT NOT NULL,
    party_id BLOB,
    document_id BLOB,
    payment_id BLOB,
    running_balance REAL NOT NULL,
    created_at TEXT NOT NULL,
    CONSTRAINT chk_ledger_entry_type CHECK (entry_type IN (
        'cash_in', 'cash_out', 'adjustment', 'deposit', 'withdrawal', 'transfer'
    ))
);

CREATE INDEX idx_le_account_version ON ledger_entries(account_id, account_version);
CREATE INDEX idx_le_payment ON ledger_entries(payment_id);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id BLOB PRIMARY KEY NOT NULL,
    number TEXT NOT NULL UNIQUE,
    direction TEXT NOT NULL,
    document_id BLOB,
    party_id BLOB,
    amount REAL NOT NULL,
    mode TEXT NOT NULL,
    bank_account_id BLOB,
    reference TEXT,
    date TEXT NOT NULL,
    ledger_entry_id BLOB,
    created_at TEXT NOT NULL,
    CONSTRAINT chk_payments_amount CHECK (amount > 0),
    CONSTRAINT chk_payments_direction CHECK (direction IN ('in', 'out')),
    CONSTRAINT chk_payments_mode CHECK (mode IN ('cash', 'bank', 'cheque'))
);

CREATE INDEX idx_payments_document ON payments(document_id);
";

const CHEQUES_SQL: &str = r"
CREATE TABLE cheques (
    id BLOB PRIMARY KEY NOT NULL,
    number TEXT NOT NULL UNIQUE,
    payment_id BLOB NOT NULL,
    cheque_number TEXT NOT NULL,
    direction TEXT NOT NULL,
    amount REAL NOT NULL,
    bank_account_id BLOB,
    party_id BLOB,
    status TEXT NOT NULL DEFAULT 'pending',
    ledger_entry_id BLOB,
    date TEXT NOT NULL,
    cleared_at TEXT,
    created_at TEXT NOT NULL,
    CONSTRAINT chk_cheques_status CHECK (status IN ('pending', 'cleared', 'bounced'))
);

CREATE INDEX idx_cheques_payment ON cheques(payment_id);
";

const HISTORY_ENTRIES_SQL: &str = r"
CREATE TABLE history_entries (
    id BLOB PRIMARY KEY NOT NULL,
    document_id BLOB NOT NULL,
    action TEXT NOT NULL,
    description TEXT NOT NULL,
    changes TEXT NOT NULL DEFAULT '[]',
    actor_id BLOB,
    actor_name TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX idx_history_document ON history_entries(document_id, created_at);

CREATE TRIGGER trg_history_no_update
BEFORE UPDATE ON history_entries
BEGIN
    SELECT RAISE(ABORT, 'history entries are append-only');
END;

CREATE TRIGGER trg_history_no_delete
BEFORE DELETE ON history_entries
BEGIN
    SELECT RAISE(ABORT, 'history entries are append-only');
END;
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS history_entries;
DROP TABLE IF EXISTS cheques;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS ledger_entries;
DROP TABLE IF EXISTS line_items;
DROP TABLE IF EXISTS documents;
DROP TABLE IF EXISTS sequence_counters;
DROP TABLE IF EXISTS bank_accounts;
DROP TABLE IF EXISTS products;
DROP TABLE IF EXISTS parties;
";
