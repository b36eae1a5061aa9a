use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use crate::domain::{
    carry_forward, CashRegister, Cents, DailyTotals, LedgerEntry, LedgerKind, RegisterId,
    RegisterReport, MAX_CENTS,
};
use crate::storage::Repository;

use super::AppError;

/// Application service for the daily cash register lifecycle.
/// This is the primary interface for any client (CLI, API, etc.).
pub struct RegisterService {
    repo: Repository,
}

impl RegisterService {
    /// Create a new register service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Ledger aggregation
    // ========================

    /// Sales and expense sums for a calendar day.
    pub async fn daily_totals(&self, date: NaiveDate) -> Result<DailyTotals, AppError> {
        let sales = self.repo.sum_ledger(LedgerKind::Sales, date).await?;
        let expenses = self.repo.sum_ledger(LedgerKind::Expenses, date).await?;
        debug!(%date, ?sales, ?expenses, "aggregated ledgers");
        Ok(DailyTotals::new(sales, expenses))
    }

    /// Record a sale at the given local time.
    pub async fn record_sale(
        &self,
        amount: Cents,
        occurred_at: NaiveDateTime,
        description: Option<String>,
    ) -> Result<LedgerEntry, AppError> {
        self.record_entry(LedgerKind::Sales, amount, occurred_at, description)
            .await
    }

    /// Record an expense at the given local time.
    pub async fn record_expense(
        &self,
        amount: Cents,
        occurred_at: NaiveDateTime,
        description: Option<String>,
    ) -> Result<LedgerEntry, AppError> {
        self.record_entry(LedgerKind::Expenses, amount, occurred_at, description)
            .await
    }

    async fn record_entry(
        &self,
        kind: LedgerKind,
        amount: Cents,
        occurred_at: NaiveDateTime,
        description: Option<String>,
    ) -> Result<LedgerEntry, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(
                "Amount must be positive".to_string(),
            ));
        }
        check_cap(amount)?;

        let entry = self
            .repo
            .insert_entry(kind, occurred_at, amount, description)
            .await?;
        debug!(kind = %kind, id = entry.id, amount, "recorded ledger entry");
        Ok(entry)
    }

    /// List one ledger's entries for a calendar day.
    pub async fn list_entries(
        &self,
        kind: LedgerKind,
        date: NaiveDate,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        Ok(self.repo.list_entries_on(kind, date).await?)
    }

    // ========================
    // Register lifecycle
    // ========================

    /// Get a register by ID.
    pub async fn get_register(&self, id: RegisterId) -> Result<CashRegister, AppError> {
        self.repo
            .get_register(id)
            .await?
            .ok_or_else(|| AppError::RegisterNotFound(id.to_string()))
    }

    /// Report on the most recent register.
    pub async fn current_report(&self) -> Result<RegisterReport, AppError> {
        let register = self
            .repo
            .latest_register()
            .await?
            .ok_or_else(|| AppError::RegisterNotFound("no registers yet".to_string()))?;
        self.report_for(&register).await
    }

    /// Report on a specific register.
    pub async fn get_report(&self, id: RegisterId) -> Result<RegisterReport, AppError> {
        let register = self.get_register(id).await?;
        self.report_for(&register).await
    }

    /// Report on every register, most recent first.
    pub async fn list_reports(&self) -> Result<Vec<RegisterReport>, AppError> {
        let registers = self.repo.list_registers().await?;
        let mut reports = Vec::with_capacity(registers.len());

        for register in &registers {
            reports.push(self.report_for(register).await?);
        }

        Ok(reports)
    }

    async fn report_for(&self, register: &CashRegister) -> Result<RegisterReport, AppError> {
        let totals = self.daily_totals(register.date).await?;
        Ok(RegisterReport::build(register, totals)?)
    }

    /// Closing balance of the most recent register, or zero when there is
    /// none yet.
    pub async fn last_closing_balance(&self) -> Result<Cents, AppError> {
        let latest = self.repo.latest_register().await?;
        Ok(latest
            .and_then(|register| register.closing_balance)
            .unwrap_or(0))
    }

    /// Open the register for `today`, carrying over the previous register's
    /// closing balance.
    pub async fn open_register(
        &self,
        requested: Option<Cents>,
        today: NaiveDate,
    ) -> Result<CashRegister, AppError> {
        if requested.is_some_and(|amount| amount < 0) {
            return Err(AppError::InvalidAmount(
                "Opening balance cannot be negative".to_string(),
            ));
        }
        if let Some(amount) = requested {
            check_cap(amount)?;
        }

        let previous = self.repo.latest_register().await?;
        let opening_balance = carry_forward(previous.as_ref(), requested)?;

        let register = self
            .repo
            .insert_register(today, opening_balance)
            .await?
            .ok_or(AppError::RegisterAlreadyOpened(today))?;

        info!(
            id = register.id,
            date = %register.date,
            opening_balance = ?register.opening_balance,
            carried_from = ?previous.map(|p| p.id),
            "opened register"
        );
        Ok(register)
    }

    /// Close a register after taking `withdrawal` out of the till.
    ///
    /// The withdrawal is checked against the cash available right now; on
    /// success the remainder becomes the closing balance.
    pub async fn close_register(
        &self,
        id: RegisterId,
        withdrawal: Cents,
    ) -> Result<CashRegister, AppError> {
        check_cap(withdrawal)?;
        let register = self.get_register(id).await?;
        let totals = self.daily_totals(register.date).await?;

        let closing_balance = register
            .closing_after_withdrawal(withdrawal, &totals)
            .map_err(|err| {
                warn!(id, withdrawal, error = %err, "rejected register close");
                AppError::from_close(id, err)
            })?;

        if !self.repo.close_register(id, closing_balance).await? {
            warn!(id, "register was closed concurrently");
            return Err(AppError::RegisterAlreadyClosed(id));
        }

        info!(id, withdrawal, closing_balance, "closed register");
        Ok(CashRegister {
            closing_balance: Some(closing_balance),
            is_open: false,
            ..register
        })
    }
}

fn check_cap(amount: Cents) -> Result<(), AppError> {
    if amount > MAX_CENTS {
        return Err(AppError::InvalidAmount(format!(
            "Amount exceeds the maximum of {} cents",
            MAX_CENTS
        )));
    }
    Ok(())
}
