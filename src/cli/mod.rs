use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};

use crate::application::RegisterService;
use crate::domain::{
    format_cents, format_optional_cents, parse_cents, LedgerKind, RegisterId, RegisterReport,
};

/// Caja - daily cash register for a restaurant till
#[derive(Parser)]
#[command(name = "caja")]
#[command(about = "Open, close and report the daily cash register")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "CAJA_DATABASE", default_value = "caja.db")]
    pub database: String,

    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, env = "CAJA_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Open today's register, carrying over the last closing balance
    Open {
        /// Cash added to the till on opening (e.g., "100.00")
        #[arg(short, long)]
        amount: Option<String>,
    },

    /// Close a register, withdrawing cash from the till
    Close {
        /// Register ID
        id: RegisterId,

        /// Amount taken out of the till (e.g., "30.00")
        #[arg(short, long)]
        withdraw: String,
    },

    /// Show a register report (latest register if no ID is given)
    Show {
        /// Register ID
        id: Option<RegisterId>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List all registers, most recent first
    List {
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the closing balance of the latest register
    LastBalance,

    /// Record a sale
    Sale(EntryArgs),

    /// Record an expense
    Expense(EntryArgs),

    /// Show sales and expense totals for a day
    Totals {
        /// Day to aggregate (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Also list the individual entries
        #[arg(long)]
        entries: bool,
    },

    /// Export register reports to CSV or JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,

        /// Export format
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
}

#[derive(clap::Args)]
pub struct EntryArgs {
    /// Amount (e.g., "12.50")
    pub amount: String,

    /// When it happened ("YYYY-MM-DD HH:MM" or "YYYY-MM-DD", defaults to now)
    #[arg(long)]
    pub at: Option<String>,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl Cli {
    /// Filter directive for the tracing subscriber.
    pub fn log_filter(&self) -> String {
        let level = if self.verbose {
            "debug"
        } else {
            self.log_level.as_str()
        };
        format!("caja={}", level)
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                RegisterService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Open { amount } => {
                let service = RegisterService::connect(&self.database).await?;
                let requested = amount
                    .map(|a| parse_cents(&a))
                    .transpose()
                    .context("Invalid amount format. Use '100.00' or '100'")?;

                let today = Local::now().date_naive();
                let register = service.open_register(requested, today).await?;
                println!(
                    "Opened register {} for {} with {}",
                    register.id,
                    register.date,
                    format_optional_cents(register.opening_balance)
                );
            }

            Commands::Close { id, withdraw } => {
                let service = RegisterService::connect(&self.database).await?;
                let withdrawal = parse_cents(&withdraw)
                    .context("Invalid amount format. Use '30.00' or '30'")?;

                let register = service.close_register(id, withdrawal).await?;
                println!(
                    "Closed register {}: withdrew {}, {} left in the till",
                    register.id,
                    format_cents(withdrawal),
                    format_optional_cents(register.closing_balance)
                );
            }

            Commands::Show { id, format } => {
                let service = RegisterService::connect(&self.database).await?;
                let report = match id {
                    Some(id) => service.get_report(id).await?,
                    None => service.current_report().await?,
                };
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                    OutputFormat::Table => print_report(&report),
                }
            }

            Commands::List { format } => {
                let service = RegisterService::connect(&self.database).await?;
                let reports = service.list_reports().await?;
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
                    OutputFormat::Table => print_report_table(&reports),
                }
            }

            Commands::LastBalance => {
                let service = RegisterService::connect(&self.database).await?;
                println!("{}", format_cents(service.last_closing_balance().await?));
            }

            Commands::Sale(args) => {
                let service = RegisterService::connect(&self.database).await?;
                run_entry_command(&service, LedgerKind::Sales, args).await?;
            }

            Commands::Expense(args) => {
                let service = RegisterService::connect(&self.database).await?;
                run_entry_command(&service, LedgerKind::Expenses, args).await?;
            }

            Commands::Totals { date, entries } => {
                let service = RegisterService::connect(&self.database).await?;
                let date = match date {
                    Some(date_str) => parse_date(&date_str)?,
                    None => Local::now().date_naive(),
                };
                run_totals_command(&service, date, entries).await?;
            }

            Commands::Export { output, format } => {
                let service = RegisterService::connect(&self.database).await?;
                run_export_command(&service, output.as_deref(), format).await?;
            }
        }

        Ok(())
    }
}

async fn run_entry_command(
    service: &RegisterService,
    kind: LedgerKind,
    args: EntryArgs,
) -> Result<()> {
    let amount = parse_cents(&args.amount).context("Invalid amount format. Use '12.50' or '12'")?;
    let occurred_at = match args.at {
        Some(at) => parse_timestamp(&at)?,
        None => Local::now().naive_local(),
    };

    let entry = match kind {
        LedgerKind::Sales => {
            service
                .record_sale(amount, occurred_at, args.description)
                .await?
        }
        LedgerKind::Expenses => {
            service
                .record_expense(amount, occurred_at, args.description)
                .await?
        }
    };

    println!(
        "Recorded {} entry {}: {} at {}",
        entry.kind,
        entry.id,
        format_cents(entry.amount),
        entry.occurred_at.format("%Y-%m-%d %H:%M")
    );
    Ok(())
}

async fn run_totals_command(service: &RegisterService, date: NaiveDate, entries: bool) -> Result<()> {
    let totals = service.daily_totals(date).await?;

    println!("Totals for {}", date);
    println!("  Sales:     {:>12}", format_optional_cents(totals.sales));
    println!("  Expenses:  {:>12}", format_optional_cents(totals.expenses));
    println!("  Net:       {:>12}", format_cents(totals.net()?));

    if entries {
        for kind in [LedgerKind::Sales, LedgerKind::Expenses] {
            let list = service.list_entries(kind, date).await?;
            println!();
            println!("{} ({})", kind, list.len());
            for entry in list {
                println!(
                    "  {:<6} {} {:>12}  {}",
                    entry.id,
                    entry.occurred_at.format("%H:%M"),
                    format_cents(entry.amount),
                    entry.description.as_deref().unwrap_or("")
                );
            }
        }
    }
    Ok(())
}

async fn run_export_command(
    service: &RegisterService,
    output: Option<&str>,
    format: ExportFormat,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match format {
        ExportFormat::Csv => exporter.export_registers_csv(writer).await?,
        ExportFormat::Json => exporter.export_registers_json(writer).await?.registers.len(),
    };
    if output.is_some() {
        eprintln!("Exported {} registers", count);
    }
    Ok(())
}

fn print_report(report: &RegisterReport) {
    println!("Register {} ({})", report.id, report.date);
    println!("  Status:          {}", status_label(report.is_open));
    println!("  Opening balance: {:>12}", format_optional_cents(report.opening_balance));
    println!("  Income:          {:>12}", format_optional_cents(report.income));
    println!("  Expense:         {:>12}", format_optional_cents(report.expense));
    println!("  Cash on hand:    {:>12}", format_cents(report.cash_on_hand));
    println!("  Handed over:     {:>12}", format_optional_cents(report.handed_over));
    println!("  Gross revenue:   {:>12}", format_optional_cents(report.gross_revenue));
    println!("  Net profit:      {:>12}", format_cents(report.net_profit));
}

fn print_report_table(reports: &[RegisterReport]) {
    if reports.is_empty() {
        println!("No registers found.");
        return;
    }

    println!(
        "{:<6} {:<10} {:<7} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "ID", "DATE", "STATUS", "OPENING", "INCOME", "EXPENSE", "CASH", "HANDED"
    );
    println!("{}", "-".repeat(90));
    for report in reports {
        println!(
            "{:<6} {:<10} {:<7} {:>12} {:>12} {:>12} {:>12} {:>12}",
            report.id,
            report.date,
            status_label(report.is_open),
            format_optional_cents(report.opening_balance),
            format_optional_cents(report.income),
            format_optional_cents(report.expense),
            format_cents(report.cash_on_hand),
            format_optional_cents(report.handed_over)
        );
    }
}

fn status_label(is_open: bool) -> &'static str {
    if is_open { "open" } else { "closed" }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}

/// Accepts "YYYY-MM-DD HH:MM[:SS]" or a bare date, which means midnight.
fn parse_timestamp(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(ts);
        }
    }

    let date = parse_date(input)
        .with_context(|| format!("Invalid timestamp '{}'. Use 'YYYY-MM-DD HH:MM'", input))?;
    Ok(date.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_timestamp_formats() {
        let ts = parse_timestamp("2024-03-15 13:45").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!((ts.hour(), ts.minute()), (13, 45));

        let ts = parse_timestamp("2024-03-15 23:59:59").unwrap();
        assert_eq!(ts.second(), 59);

        let ts = parse_timestamp("2024-03-15").unwrap();
        assert_eq!((ts.hour(), ts.minute()), (0, 0));

        assert!(parse_timestamp("15/03/2024").is_err());
    }

    #[test]
    fn test_log_filter_verbose_overrides_level() {
        let cli = Cli::parse_from(["caja", "--verbose", "last-balance"]);
        assert_eq!(cli.log_filter(), "caja=debug");

        let cli = Cli::parse_from(["caja", "--log-level", "info", "last-balance"]);
        assert_eq!(cli.log_filter(), "caja=info");
    }

    #[test]
    fn test_close_requires_withdrawal() {
        assert!(Cli::try_parse_from(["caja", "close", "3"]).is_err());
        let cli = Cli::parse_from(["caja", "close", "3", "--withdraw", "30"]);
        assert!(matches!(cli.command, Commands::Close { id: 3, .. }));
    }
}
