// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use caja::application::RegisterService;
use caja::Repository;
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(RegisterService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = RegisterService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to open a second handle on the database behind `test_service`,
/// for seeding rows the service would refuse to write
pub async fn test_repository(temp_dir: &TempDir) -> Result<Repository> {
    let db_path = temp_dir.path().join("test.db");
    Repository::connect(&format!("sqlite:{}", db_path.display())).await
}

/// Helper to parse a date string into NaiveDate
pub fn day(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Helper to parse "YYYY-MM-DD HH:MM" into a local timestamp
pub fn at(ts: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M").unwrap()
}

/// Test fixture: one day of restaurant activity
pub struct DayActivity;

impl DayActivity {
    /// Record the given sales and expenses at midday on `date`.
    pub async fn record(
        service: &RegisterService,
        date: &str,
        sales: &[i64],
        expenses: &[i64],
    ) -> Result<()> {
        let noon = at(&format!("{} 12:00", date));
        for amount in sales {
            service.record_sale(*amount, noon, None).await?;
        }
        for amount in expenses {
            service.record_expense(*amount, noon, None).await?;
        }
        Ok(())
    }
}
