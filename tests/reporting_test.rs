mod common;

use anyhow::Result;
use caja::domain::LedgerKind;
use common::{at, day, test_service, DayActivity};

#[tokio::test]
async fn test_daily_totals_only_count_the_same_calendar_day() -> Result<()> {
    let (service, _temp) = test_service().await?;

    // Same day, spread across the whole day
    service.record_sale(1000, at("2024-03-15 00:00"), None).await?;
    service.record_sale(2000, at("2024-03-15 23:59"), None).await?;
    service.record_expense(500, at("2024-03-15 09:30"), None).await?;

    // Neighbouring days and the same day in another month or year
    service.record_sale(9000, at("2024-03-14 23:59"), None).await?;
    service.record_sale(9000, at("2024-03-16 00:00"), None).await?;
    service.record_sale(9000, at("2024-04-15 12:00"), None).await?;
    service.record_sale(9000, at("2023-03-15 12:00"), None).await?;
    service.record_expense(9000, at("2024-02-15 12:00"), None).await?;

    let totals = service.daily_totals(day("2024-03-15")).await?;
    assert_eq!(totals.sales, Some(3000));
    assert_eq!(totals.expenses, Some(500));
    assert_eq!(totals.net(), Ok(2500));

    Ok(())
}

#[tokio::test]
async fn test_daily_totals_absent_when_no_records() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.record_sale(1000, at("2024-03-15 12:00"), None).await?;

    let totals = service.daily_totals(day("2024-03-15")).await?;
    assert_eq!(totals.sales, Some(1000));
    assert_eq!(totals.expenses, None);

    let empty = service.daily_totals(day("2024-03-16")).await?;
    assert_eq!(empty.sales, None);
    assert_eq!(empty.expenses, None);
    assert_eq!(empty.net(), Ok(0));

    Ok(())
}

#[tokio::test]
async fn test_recording_rejects_non_positive_amounts() -> Result<()> {
    let (service, _temp) = test_service().await?;

    assert!(service.record_sale(0, at("2024-03-15 12:00"), None).await.is_err());
    assert!(service.record_expense(-100, at("2024-03-15 12:00"), None).await.is_err());
    assert_eq!(service.daily_totals(day("2024-03-15")).await?.sales, None);

    Ok(())
}

#[tokio::test]
async fn test_list_entries_for_day() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service
        .record_expense(1200, at("2024-03-15 18:00"), Some("ice".into()))
        .await?;
    service
        .record_expense(800, at("2024-03-15 08:00"), Some("bread".into()))
        .await?;
    service.record_expense(999, at("2024-03-16 08:00"), None).await?;

    let entries = service.list_entries(LedgerKind::Expenses, day("2024-03-15")).await?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].description.as_deref(), Some("bread"));
    assert_eq!(entries[1].amount, 1200);
    assert!(entries.iter().all(|e| e.kind == LedgerKind::Expenses));

    let sales = service.list_entries(LedgerKind::Sales, day("2024-03-15")).await?;
    assert!(sales.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_current_report_on_empty_store_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.current_report().await.unwrap_err();
    assert!(err.is_not_found());
    assert!(service.get_report(1).await.unwrap_err().is_not_found());

    Ok(())
}

#[tokio::test]
async fn test_current_report_derives_figures() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.open_register(Some(10000), day("2024-03-15")).await?;
    DayActivity::record(&service, "2024-03-15", &[5000], &[2000]).await?;

    let report = service.current_report().await?;
    assert!(report.is_open);
    assert_eq!(report.date, day("2024-03-15"));
    assert_eq!(report.opening_balance, Some(10000));
    assert_eq!(report.income, Some(5000));
    assert_eq!(report.expense, Some(2000));
    assert_eq!(report.cash_on_hand, 13000);
    assert_eq!(report.handed_over, Some(0));
    assert_eq!(report.gross_revenue, Some(5000));
    assert_eq!(report.net_profit, 3000);

    Ok(())
}

#[tokio::test]
async fn test_report_reflects_ledger_changes_between_calls() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let register = service.open_register(Some(1000), day("2024-03-15")).await?;
    assert_eq!(service.get_report(register.id).await?.cash_on_hand, 1000);

    DayActivity::record(&service, "2024-03-15", &[400], &[]).await?;
    assert_eq!(service.get_report(register.id).await?.cash_on_hand, 1400);

    Ok(())
}

#[tokio::test]
async fn test_current_report_follows_latest_register() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let first = service.open_register(Some(10000), day("2024-03-15")).await?;
    service.close_register(first.id, 0).await?;
    let second = service.open_register(None, day("2024-03-16")).await?;

    let report = service.current_report().await?;
    assert_eq!(report.id, second.id);
    assert_eq!(report.opening_balance, Some(10000));

    Ok(())
}

#[tokio::test]
async fn test_list_reports_most_recent_first() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let first = service.open_register(Some(10000), day("2024-03-15")).await?;
    DayActivity::record(&service, "2024-03-15", &[5000], &[2000]).await?;
    service.close_register(first.id, 3000).await?;

    let second = service.open_register(Some(1000), day("2024-03-16")).await?;
    DayActivity::record(&service, "2024-03-16", &[], &[500]).await?;

    let reports = service.list_reports().await?;
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0].id, second.id);
    assert_eq!(reports[0].income, None);
    assert_eq!(reports[0].expense, Some(500));
    assert_eq!(reports[0].cash_on_hand, 10500);
    assert_eq!(reports[0].net_profit, -500);

    assert_eq!(reports[1].id, first.id);
    assert!(!reports[1].is_open);
    assert_eq!(reports[1].handed_over, Some(10000));
    assert_eq!(reports[1].cash_on_hand, 13000);

    Ok(())
}
