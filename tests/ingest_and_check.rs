use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fs;

use lotto_scan::catalog::PrizeCatalog;
use lotto_scan::database::{get_draw_by_date, open_database};
use lotto_scan::ingest::ingest_directory;
use lotto_scan::matching::{QueryLimits, check_ticket};
use lotto_scan::types::{MatchResult, MatchTier};

const DOCUMENT: &str = "NATIONAL LOTTERIES BOARD
Mahajana Sampatha Draw No: 5123

1st Prize Rs : 10,000,000
DF 869610

2nd Prize Rs. : 1,000,000
KM 004512  KM 771203

4th Prize Rs : 500
038304630500 9921

Consolation Prize Rs : 5,000
9610 0383

Prizes must be claimed within 90 days. Page 2 of 2
";

#[test]
fn ingest_then_check_tickets() {
    let dir = tempfile::tempdir().unwrap();
    let docs = dir.path().join("documents");
    fs::create_dir_all(&docs).unwrap();
    fs::write(docs.join("mahajana-sampatha_2025-01-02.txt"), DOCUMENT).unwrap();

    let db_path = dir.path().join("data").join("lottery.db");
    let conn = open_database(db_path.to_str().unwrap()).unwrap();
    let catalog = PrizeCatalog::standard().unwrap();

    let summary = ingest_directory(&conn, &docs, &catalog).unwrap();
    assert_eq!(summary.ingested, 1);
    assert_eq!(summary.failed, 0);

    let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    let record = get_draw_by_date(&conn, "Mahajana Sampatha", date)
        .unwrap()
        .unwrap();

    let names: Vec<&str> = record.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["1st Prize", "2nd Prize", "4th Prize", "Consolation"]);
    assert_eq!(record.info.draw_number.as_deref(), Some("5123"));
    assert_eq!(record.categories[1].amount, Decimal::from(1_000_000));
    assert_eq!(record.categories[1].tickets.len(), 2);
    let fourth: Vec<&str> = record.categories[2]
        .tickets
        .iter()
        .map(|t| t.number.as_str())
        .collect();
    assert_eq!(fourth, vec!["0383", "0463", "0500", "9921"]);

    let limits = QueryLimits::default();

    let jackpot =
        check_ticket("df869610", &limits, "Mahajana Sampatha", date, Some(&record)).unwrap();
    match jackpot {
        MatchResult::Win { category, tier, .. } => {
            assert_eq!(category.name, "1st Prize");
            assert_eq!(tier, MatchTier::Exact);
        }
        other => panic!("expected win, got {:?}", other),
    }

    // 0383 sits in both 4th Prize (500) and Consolation (5,000).
    let shared = check_ticket("0383", &limits, "Mahajana Sampatha", date, Some(&record)).unwrap();
    match shared {
        MatchResult::Win { category, .. } => assert_eq!(category.name, "Consolation"),
        other => panic!("expected win, got {:?}", other),
    }

    let miss =
        check_ticket("KM 004513", &limits, "Mahajana Sampatha", date, Some(&record)).unwrap();
    assert!(matches!(miss, MatchResult::NoWin { .. }));

    let other_day = date.succ_opt().unwrap();
    let absent = get_draw_by_date(&conn, "Mahajana Sampatha", other_day).unwrap();
    let no_draw =
        check_ticket("0383", &limits, "Mahajana Sampatha", other_day, absent.as_ref()).unwrap();
    assert!(matches!(no_draw, MatchResult::NoDraw { .. }));
}
