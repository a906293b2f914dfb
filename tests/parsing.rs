use std::path::PathBuf;

use chrono::NaiveDate;

use rok_terminal::dataset::Dataset;
use rok_terminal::snapshot::{parse_count, parse_date};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

#[test]
fn loads_fixture_and_skips_rows_without_id() {
    let dataset = Dataset::from_csv_path(&fixture_path("master_data.csv"))
        .expect("fixture should load");

    // 7 data rows: one has no id, one is a same-day duplicate of 1001.
    assert_eq!(dataset.len(), 5);
    assert_eq!(dataset.player_count(), 3);
    assert_eq!(
        dataset.dates(),
        vec![date(2025, 9, 24), date(2025, 10, 1)]
    );
}

#[test]
fn same_day_duplicate_keeps_last_row() {
    let dataset = Dataset::from_csv_path(&fixture_path("master_data.csv"))
        .expect("fixture should load");

    let rows = dataset.rows_on(date(2025, 9, 24));
    assert_eq!(rows.len(), 3);
    // The duplicate replaces in place, so 1001 stays first.
    assert_eq!(rows[0].id, "1001");
    assert_eq!(rows[0].power, 81_000_000);
    assert_eq!(rows[0].t4_kills, 1_100_000);
}

#[test]
fn both_date_formats_parse() {
    let dataset = Dataset::from_csv_path(&fixture_path("master_data.csv"))
        .expect("fixture should load");

    // 2025/09/24 (slash) and 2025-10-01 (dash) both present.
    assert_eq!(dataset.earliest_date(), Some(date(2025, 9, 24)));
    assert_eq!(dataset.latest_date(), Some(date(2025, 10, 1)));
}

#[test]
fn find_player_is_case_insensitive_and_prefers_latest() {
    let dataset = Dataset::from_csv_path(&fixture_path("master_data.csv"))
        .expect("fixture should load");

    let hit = dataset.find_player("ALD").expect("Alder should match");
    assert_eq!(hit.id, "1001");
    assert_eq!(hit.date, date(2025, 10, 1));

    assert!(dataset.find_player("nobody-here").is_none());
    assert!(dataset.find_player("   ").is_none());
}

#[test]
fn header_only_csv_is_an_error() {
    let raw = "Date,ID,Name,Alliance,Power,T4-Kills,T5-Kills,Total Kill Points,Dead Troops,Troops Power\n";
    assert!(Dataset::from_reader(raw.as_bytes()).is_err());
}

#[test]
fn legacy_data_header_is_accepted() {
    let raw = "\
Data,ID,Name,Alliance,Power,T4-Kills,T5-Kills,Total Kill Points,Dead Troops,Troops Power
2025/09/24,7,Yara,XYZ,\"50,000,000\",0,0,0,0,0
";
    let dataset = Dataset::from_reader(raw.as_bytes()).expect("legacy header should load");
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.rows_on(date(2025, 9, 24))[0].power, 50_000_000);
}

#[test]
fn count_coercion_handles_sheet_noise() {
    assert_eq!(parse_count("85,123,456"), 85_123_456);
    assert_eq!(parse_count(" 1200 "), 1200);
    assert_eq!(parse_count(""), 0);
    assert_eq!(parse_count("-"), 0);
    assert_eq!(parse_count("N/A"), 0);
}

#[test]
fn date_coercion_handles_both_separators() {
    assert_eq!(parse_date("2025/09/24"), Some(date(2025, 9, 24)));
    assert_eq!(parse_date("2025/9/24"), Some(date(2025, 9, 24)));
    assert_eq!(parse_date("2025-10-01"), Some(date(2025, 10, 1)));
    assert_eq!(parse_date("24.09.2025"), None);
    assert_eq!(parse_date(""), None);
}
