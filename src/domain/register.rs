use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{add_cents, sub_cents, AmountOverflow, Cents, DailyTotals};

pub type RegisterId = i64;

/// One business day's cash till.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashRegister {
    pub id: RegisterId,
    pub date: NaiveDate,
    pub opening_balance: Option<Cents>,
    pub closing_balance: Option<Cents>,
    pub is_open: bool,
}

impl CashRegister {
    /// Cash in the till right now: opening balance plus the day's sales minus
    /// the day's expenses. Absent values count as zero.
    pub fn available_cash(&self, totals: &DailyTotals) -> Result<Cents, AmountOverflow> {
        add_cents(self.opening_balance.unwrap_or(0), totals.net()?)
    }

    /// Check a close-time withdrawal and return the closing balance it leaves.
    ///
    /// A withdrawal equal to the available cash is accepted and leaves zero.
    pub fn closing_after_withdrawal(
        &self,
        withdrawal: Cents,
        totals: &DailyTotals,
    ) -> Result<Cents, CloseError> {
        if !self.is_open {
            return Err(CloseError::AlreadyClosed);
        }
        if withdrawal < 0 {
            return Err(CloseError::NegativeWithdrawal(withdrawal));
        }

        let available = self.available_cash(totals)?;
        if available < withdrawal {
            return Err(CloseError::InsufficientCash {
                available,
                requested: withdrawal,
            });
        }
        Ok(sub_cents(available, withdrawal)?)
    }
}

/// Opening balance for a new register.
///
/// When the previous register has a closing balance it is carried over and
/// the requested amount is added on top. Otherwise the requested amount is
/// used as-is, and an absent request stays absent.
pub fn carry_forward(
    previous: Option<&CashRegister>,
    requested: Option<Cents>,
) -> Result<Option<Cents>, AmountOverflow> {
    match previous.and_then(|register| register.closing_balance) {
        Some(closing) => add_cents(closing, requested.unwrap_or(0)).map(Some),
        None => Ok(requested),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseError {
    AlreadyClosed,
    NegativeWithdrawal(Cents),
    InsufficientCash { available: Cents, requested: Cents },
    Overflow,
}

impl From<AmountOverflow> for CloseError {
    fn from(_: AmountOverflow) -> Self {
        CloseError::Overflow
    }
}

impl std::fmt::Display for CloseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CloseError::AlreadyClosed => write!(f, "register is already closed"),
            CloseError::NegativeWithdrawal(amount) => {
                write!(f, "withdrawal cannot be negative ({} cents)", amount)
            }
            CloseError::InsufficientCash {
                available,
                requested,
            } => write!(
                f,
                "insufficient cash in register: {} cents available, {} cents requested",
                available, requested
            ),
            CloseError::Overflow => write!(f, "register balance out of range"),
        }
    }
}

impl std::error::Error for CloseError {}

/// A register merged with the figures derived from the day's ledgers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterReport {
    pub id: RegisterId,
    pub date: NaiveDate,
    pub is_open: bool,
    pub opening_balance: Option<Cents>,
    /// Total sales for the day.
    pub income: Option<Cents>,
    /// Total expenses for the day.
    pub expense: Option<Cents>,
    pub cash_on_hand: Cents,
    /// Closing balance, the cash handed over to the next day.
    pub handed_over: Option<Cents>,
    pub gross_revenue: Option<Cents>,
    pub net_profit: Cents,
}

impl RegisterReport {
    pub fn build(register: &CashRegister, totals: DailyTotals) -> Result<Self, AmountOverflow> {
        Ok(Self {
            id: register.id,
            date: register.date,
            is_open: register.is_open,
            opening_balance: register.opening_balance,
            income: totals.sales,
            expense: totals.expenses,
            cash_on_hand: register.available_cash(&totals)?,
            handed_over: register.closing_balance,
            gross_revenue: totals.sales,
            net_profit: totals.net()?,
        })
    }
}
