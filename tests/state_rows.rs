use std::path::PathBuf;

use chrono::NaiveDate;

use rok_terminal::config::Config;
use rok_terminal::dataset::{Dataset, PeriodPreset};
use rok_terminal::quota::DeathTargetMode;
use rok_terminal::snapshot::PlayerSnapshot;
use rok_terminal::state::{AppState, QuotaView, Tab};

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).expect("valid test date")
}

fn snap(on: NaiveDate, id: &str, name: &str, power: u64, kp: u64) -> PlayerSnapshot {
    PlayerSnapshot {
        date: on,
        id: id.to_string(),
        name: name.to_string(),
        alliance: "AAA".to_string(),
        power,
        t4_kills: 0,
        t5_kills: 0,
        total_kill_points: kp,
        dead_troops: 0,
        troops_power: 0,
    }
}

fn test_config() -> Config {
    Config {
        csv_path: PathBuf::from("unused.csv"),
        campaign_start: date(9, 24),
        death_mode: DeathTargetMode::RateOfStartPower,
        top_n: 300,
        page_size: 2,
    }
}

fn test_state() -> AppState {
    let dataset = Dataset::from_rows(vec![
        snap(date(9, 24), "1", "Alder", 80_000_000, 100_000_000),
        snap(date(9, 24), "2", "Briar", 90_000_000, 120_000_000),
        snap(date(9, 24), "3", "Cedar", 50_000_000, 10_000_000),
        snap(date(10, 1), "1", "Alder", 82_000_000, 130_000_000),
        snap(date(10, 1), "2", "Briar", 91_000_000, 160_000_000),
        snap(date(10, 1), "3", "Cedar", 51_000_000, 12_000_000),
        snap(date(10, 20), "1", "Alder", 85_000_000, 300_000_000),
        snap(date(10, 20), "2", "Briar", 93_000_000, 200_000_000),
        snap(date(10, 20), "3", "Cedar", 52_000_000, 15_000_000),
    ]);
    AppState::new(dataset, test_config())
}

#[test]
fn starts_on_latest_date_sorted_by_power_desc() {
    let state = test_state();
    assert_eq!(state.data_date(), Some(date(10, 20)));
    let rows = state.data_rows();
    assert_eq!(rows[0].name, "Briar");
    assert_eq!(rows[1].name, "Alder");
    assert_eq!(rows[2].name, "Cedar");
}

#[test]
fn pagination_respects_configured_page_size() {
    let mut state = test_state();
    assert_eq!(state.data_page_count(), 2);
    state.data_next_page();
    assert_eq!(state.data_page, 1);
    // Already on the last page.
    state.data_next_page();
    assert_eq!(state.data_page, 1);
    state.data_prev_page();
    assert_eq!(state.data_page, 0);
}

#[test]
fn search_filters_data_rows_and_resets_page() {
    let mut state = test_state();
    state.data_next_page();
    state.search_push('b');
    state.search_push('r');
    assert_eq!(state.data_page, 0);
    let rows = state.data_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Briar");
}

#[test]
fn growth_preset_all_spans_earliest_to_latest() {
    let mut state = test_state();
    state.growth_apply_preset(PeriodPreset::All);
    assert_eq!(state.growth_range(), Some((date(9, 24), date(10, 20))));
    assert_eq!(state.growth_entries.len(), 3);
}

#[test]
fn growth_defaults_to_latest_pair_of_dates() {
    let state = test_state();
    assert_eq!(state.growth_range(), Some((date(10, 1), date(10, 20))));
}

#[test]
fn submit_search_on_trends_resolves_player_and_series() {
    let mut state = test_state();
    state.set_tab(Tab::Trends);
    state.toggle_search();
    for ch in "alder".chars() {
        state.search_push(ch);
    }
    state.submit_search();

    let player = state.trend_player.as_ref().expect("player resolved");
    assert_eq!(player.id, "1");
    assert_eq!(state.trend_series.len(), 3);
    // Power series, ascending by date.
    assert_eq!(state.trend_series[0], (date(9, 24), 80_000_000));
    assert_eq!(state.trend_series[2], (date(10, 20), 85_000_000));
}

#[test]
fn submit_search_on_checker_resolves_quota_progress() {
    let mut state = test_state();
    state.set_tab(Tab::Quota);
    assert_eq!(state.quota_view, QuotaView::Checker);
    state.toggle_search();
    for ch in "briar".chars() {
        state.search_push(ch);
    }
    state.submit_search();

    let progress = state.quota_progress.as_ref().expect("progress computed");
    assert!(!progress.used_fallback_start);
    assert_eq!(progress.kill_progress, 80_000_000);
    assert_eq!(state.quota_series.len(), 3);
}

#[test]
fn failed_search_clears_selection_and_logs() {
    let mut state = test_state();
    state.set_tab(Tab::Trends);
    state.toggle_search();
    state.search_push('z');
    state.search_push('z');
    state.submit_search();

    assert!(state.trend_player.is_none());
    assert!(state.trend_series.is_empty());
    assert!(state.logs.iter().any(|line| line.contains("no player")));
}

#[test]
fn roster_refresh_covers_every_player() {
    let state = test_state();
    assert_eq!(state.roster.len(), 3);
    assert_eq!(state.roster_rows().len(), 3);
}

#[test]
fn tab_cycling_wraps_around() {
    let mut state = test_state();
    for _ in 0..5 {
        state.next_tab();
    }
    assert_eq!(state.tab, Tab::Data);
}
