use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{sub_cents, AmountOverflow, Cents};

pub type EntryId = i64;

/// The two record streams aggregated against a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Sales,
    Expenses,
}

impl LedgerKind {
    /// Also the name of the backing table.
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Sales => "sales",
            LedgerKind::Expenses => "expenses",
        }
    }
}

impl std::fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single sale or expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub kind: LedgerKind,
    pub occurred_at: NaiveDateTime,
    pub amount: Cents,
    pub description: Option<String>,
}

/// Sales and expense sums for one calendar day.
///
/// `None` means the ledger had no records that day, which is distinct from a
/// zero total. Arithmetic treats it as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTotals {
    pub sales: Option<Cents>,
    pub expenses: Option<Cents>,
}

impl DailyTotals {
    pub fn new(sales: Option<Cents>, expenses: Option<Cents>) -> Self {
        Self { sales, expenses }
    }

    /// Sales minus expenses.
    pub fn net(&self) -> Result<Cents, AmountOverflow> {
        sub_cents(self.sales.unwrap_or(0), self.expenses.unwrap_or(0))
    }
}
