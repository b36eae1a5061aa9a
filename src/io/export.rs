use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::RegisterService;
use crate::domain::{format_cents, Cents, RegisterReport};

/// Snapshot of every register report, written by the JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub registers: Vec<RegisterReport>,
}

/// Exporter for writing register reports to CSV or JSON
pub struct Exporter<'a> {
    service: &'a RegisterService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a RegisterService) -> Self {
        Self { service }
    }

    /// Export register reports to CSV, most recent first.
    /// Amounts are written as decimals; missing sums are left empty.
    pub async fn export_registers_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let reports = self.service.list_reports().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "date",
            "status",
            "opening_balance",
            "income",
            "expense",
            "cash_on_hand",
            "handed_over",
            "gross_revenue",
            "net_profit",
        ])?;

        for report in &reports {
            csv_writer.write_record([
                report.id.to_string(),
                report.date.to_string(),
                if report.is_open { "open" } else { "closed" }.to_string(),
                csv_amount(report.opening_balance),
                csv_amount(report.income),
                csv_amount(report.expense),
                format_cents(report.cash_on_hand),
                csv_amount(report.handed_over),
                csv_amount(report.gross_revenue),
                format_cents(report.net_profit),
            ])?;
        }

        csv_writer.flush()?;
        Ok(reports.len())
    }

    /// Export all register reports as a JSON snapshot
    pub async fn export_registers_json<W: Write>(&self, mut writer: W) -> Result<RegisterSnapshot> {
        let registers = self.service.list_reports().await?;

        let snapshot = RegisterSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            registers,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}

fn csv_amount(cents: Option<Cents>) -> String {
    cents.map(format_cents).unwrap_or_default()
}
