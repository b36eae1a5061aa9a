use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use sqlx::{Row, SqlitePool};

use crate::domain::{CashRegister, Cents, EntryId, LedgerEntry, LedgerKind, RegisterId};

use super::MIGRATION_001_INITIAL;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ledger timestamps are stored as local wall-clock time, which SQLite's
/// `strftime` understands directly.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const REGISTER_COLUMNS: &str = "id, date, opening_balance, closing_balance, is_open";

/// Repository for persisting cash registers and querying the sales and
/// expense ledgers.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Register operations
    // ========================

    /// Insert a new open register for `date` unless one already exists for
    /// that date. Returns `None` when the date was already taken.
    pub async fn insert_register(
        &self,
        date: NaiveDate,
        opening_balance: Option<Cents>,
    ) -> Result<Option<CashRegister>> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO cash_registers (date, opening_balance, closing_balance, is_open)
            VALUES (?, ?, 0, 1)
            "#,
        )
        .bind(date.format(DATE_FORMAT).to_string())
        .bind(opening_balance)
        .execute(&self.pool)
        .await
        .context("Failed to save register")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Ok(Some(CashRegister {
            id: result.last_insert_rowid(),
            date,
            opening_balance,
            closing_balance: Some(0),
            is_open: true,
        }))
    }

    /// Get a register by ID.
    pub async fn get_register(&self, id: RegisterId) -> Result<Option<CashRegister>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM cash_registers WHERE id = ?",
            REGISTER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch register")?;

        row.as_ref().map(Self::row_to_register).transpose()
    }

    /// Get the register with the highest ID.
    pub async fn latest_register(&self) -> Result<Option<CashRegister>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM cash_registers ORDER BY id DESC LIMIT 1",
            REGISTER_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch latest register")?;

        row.as_ref().map(Self::row_to_register).transpose()
    }

    /// List all registers, most recent first.
    pub async fn list_registers(&self) -> Result<Vec<CashRegister>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM cash_registers ORDER BY id DESC",
            REGISTER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list registers")?;

        rows.iter().map(Self::row_to_register).collect()
    }

    /// Mark an open register as closed with the given closing balance.
    /// Returns false when the register was not open at write time.
    pub async fn close_register(&self, id: RegisterId, closing_balance: Cents) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE cash_registers
            SET closing_balance = ?, is_open = 0
            WHERE id = ? AND is_open = 1
            "#,
        )
        .bind(closing_balance)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to close register")?;

        Ok(result.rows_affected() == 1)
    }

    fn row_to_register(row: &sqlx::sqlite::SqliteRow) -> Result<CashRegister> {
        let date_str: String = row.get("date");

        Ok(CashRegister {
            id: row.get("id"),
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .context("Invalid register date")?,
            opening_balance: row.get("opening_balance"),
            closing_balance: row.get("closing_balance"),
            is_open: row.get::<i32, _>("is_open") != 0,
        })
    }

    // ========================
    // Ledger operations
    // ========================

    /// Append an entry to the sales or expense ledger.
    pub async fn insert_entry(
        &self,
        kind: LedgerKind,
        occurred_at: NaiveDateTime,
        amount: Cents,
        description: Option<String>,
    ) -> Result<LedgerEntry> {
        let result = sqlx::query(&format!(
            "INSERT INTO {} (occurred_at, amount_cents, description) VALUES (?, ?, ?)",
            kind.as_str()
        ))
        .bind(occurred_at.format(TIMESTAMP_FORMAT).to_string())
        .bind(amount)
        .bind(&description)
        .execute(&self.pool)
        .await
        .with_context(|| format!("Failed to save {} entry", kind))?;

        Ok(LedgerEntry {
            id: result.last_insert_rowid(),
            kind,
            occurred_at,
            amount,
            description,
        })
    }

    /// List the entries of one ledger that fall on `date`.
    pub async fn list_entries_on(&self, kind: LedgerKind, date: NaiveDate) -> Result<Vec<LedgerEntry>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT id, occurred_at, amount_cents, description
            FROM {}
            WHERE {}
            ORDER BY occurred_at, id
            "#,
            kind.as_str(),
            SAME_DAY_FILTER
        ))
        .bind(i64::from(date.day()))
        .bind(i64::from(date.month()))
        .bind(i64::from(date.year()))
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to list {} entries", kind))?;

        rows.iter()
            .map(|row| Self::row_to_entry(kind, row))
            .collect()
    }

    /// Sum one ledger's amounts on `date`.
    /// Returns `None` when the ledger has no entries that day.
    pub async fn sum_ledger(&self, kind: LedgerKind, date: NaiveDate) -> Result<Option<Cents>> {
        let row = sqlx::query(&format!(
            "SELECT SUM(amount_cents) as total FROM {} WHERE {}",
            kind.as_str(),
            SAME_DAY_FILTER
        ))
        .bind(i64::from(date.day()))
        .bind(i64::from(date.month()))
        .bind(i64::from(date.year()))
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to sum {} ledger", kind))?;

        Ok(row.get("total"))
    }

    fn row_to_entry(kind: LedgerKind, row: &sqlx::sqlite::SqliteRow) -> Result<LedgerEntry> {
        let occurred_at_str: String = row.get("occurred_at");

        Ok(LedgerEntry {
            id: row.get::<EntryId, _>("id"),
            kind,
            occurred_at: NaiveDateTime::parse_from_str(&occurred_at_str, TIMESTAMP_FORMAT)
                .context("Invalid entry timestamp")?,
            amount: row.get("amount_cents"),
            description: row.get("description"),
        })
    }
}

/// Matches day, month and year separately, binding them in that order.
const SAME_DAY_FILTER: &str = r#"
    CAST(strftime('%d', occurred_at) AS INTEGER) = ?
    AND CAST(strftime('%m', occurred_at) AS INTEGER) = ?
    AND CAST(strftime('%Y', occurred_at) AS INTEGER) = ?
"#;
