use chrono::NaiveDate;

use rok_terminal::dataset::Dataset;
use rok_terminal::quota::{
    band_for_power, band_label, compute_quota_progress, quota_roster, DeathTargetMode,
    RosterFilter, RosterSort,
};
use rok_terminal::snapshot::PlayerSnapshot;

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).expect("valid test date")
}

fn snap(on: NaiveDate, id: &str, power: u64, kp: u64, dead: u64) -> PlayerSnapshot {
    PlayerSnapshot {
        date: on,
        id: id.to_string(),
        name: format!("P{id}"),
        alliance: "AAA".to_string(),
        power,
        t4_kills: kp / 10,
        t5_kills: kp / 20,
        total_kill_points: kp,
        dead_troops: dead,
        troops_power: power / 2,
    }
}

const START: NaiveDate = match NaiveDate::from_ymd_opt(2025, 9, 24) {
    Some(d) => d,
    None => panic!("valid campaign start"),
};

#[test]
fn band_lookup_honors_boundaries() {
    assert!(band_for_power(44_999_999).is_none());
    assert_eq!(band_for_power(45_000_000).map(|b| b.kill_target), Some(75_000_000));
    assert_eq!(band_for_power(59_999_999).map(|b| b.kill_target), Some(75_000_000));
    assert_eq!(band_for_power(60_000_000).map(|b| b.kill_target), Some(150_000_000));
    // The top band is open-ended.
    assert_eq!(band_for_power(1_000_000_000).map(|b| b.kill_target), Some(600_000_000));
    assert_eq!(band_label(30_000_000), "under 45M");
    assert_eq!(band_label(82_000_000), "80M-85.0M");
}

#[test]
fn checker_matches_worked_example() {
    let start = snap(START, "1", 80_000_000, 100_000_000, 200_000);
    let now = snap(date(10, 20), "1", 80_000_000, 150_000_000, 650_000);
    let history = [&start, &now];

    let progress =
        compute_quota_progress(&history, START, DeathTargetMode::RateOfStartPower)
            .expect("non-empty history");

    assert_eq!(progress.kill_target, 200_000_000);
    assert_eq!(progress.kill_progress, 50_000_000);
    assert_eq!(progress.kill_pct, 25.0);
    assert_eq!(progress.kill_remaining, 150_000_000);

    // 80M start power at a 0.005 death rate.
    assert_eq!(progress.death_target, 400_000);
    assert_eq!(progress.death_progress, 450_000);
    assert_eq!(progress.death_pct, 100.0);
    assert_eq!(progress.death_remaining, 0);

    assert_eq!(progress.overall_pct, 62.5);
    assert!(!progress.used_fallback_start);
}

#[test]
fn fixed_mode_uses_band_death_target() {
    let start = snap(START, "1", 80_000_000, 0, 0);
    let now = snap(date(10, 20), "1", 80_000_000, 0, 425_000);
    let history = [&start, &now];

    let progress = compute_quota_progress(&history, START, DeathTargetMode::Fixed)
        .expect("non-empty history");
    assert_eq!(progress.death_target, 425_000);
    assert_eq!(progress.death_pct, 100.0);
}

#[test]
fn band_resolves_from_current_power_target_from_start_power() {
    // Grew from the 80M band into the 90M band during the campaign.
    let start = snap(START, "1", 80_000_000, 0, 0);
    let now = snap(date(10, 20), "1", 92_000_000, 0, 0);
    let history = [&start, &now];

    let progress =
        compute_quota_progress(&history, START, DeathTargetMode::RateOfStartPower)
            .expect("non-empty history");
    // 90M band kill target, death rate 0.0058 applied to 80M start power.
    assert_eq!(progress.kill_target, 300_000_000);
    assert_eq!(progress.death_target, 464_000);
}

#[test]
fn below_band_power_has_zero_targets_and_zero_pct() {
    let start = snap(START, "1", 30_000_000, 0, 0);
    let now = snap(date(10, 20), "1", 40_000_000, 5_000_000, 10_000);
    let history = [&start, &now];

    let progress =
        compute_quota_progress(&history, START, DeathTargetMode::RateOfStartPower)
            .expect("non-empty history");
    assert!(progress.band.is_none());
    assert_eq!(progress.kill_target, 0);
    assert_eq!(progress.kill_pct, 0.0);
    assert_eq!(progress.death_pct, 0.0);
    assert_eq!(progress.overall_pct, 0.0);
    assert_eq!(progress.kill_remaining, 0);
}

#[test]
fn missing_start_snapshot_falls_back_to_earliest() {
    let first = snap(date(10, 1), "1", 80_000_000, 10_000_000, 0);
    let later = snap(date(10, 20), "1", 80_000_000, 30_000_000, 0);
    let history = [&later, &first];

    let progress =
        compute_quota_progress(&history, START, DeathTargetMode::RateOfStartPower)
            .expect("non-empty history");
    assert!(progress.used_fallback_start);
    assert_eq!(progress.start.date, date(10, 1));
    assert_eq!(progress.kill_progress, 20_000_000);
}

#[test]
fn empty_history_yields_none() {
    assert!(compute_quota_progress(&[], START, DeathTargetMode::Fixed).is_none());
}

#[test]
fn negative_progress_clamps_to_zero_pct() {
    // Account reset: fewer recorded kills now than at the start.
    let start = snap(START, "1", 80_000_000, 100_000_000, 500_000);
    let now = snap(date(10, 20), "1", 80_000_000, 60_000_000, 400_000);
    let history = [&start, &now];

    let progress =
        compute_quota_progress(&history, START, DeathTargetMode::RateOfStartPower)
            .expect("non-empty history");
    assert_eq!(progress.kill_progress, -40_000_000);
    assert_eq!(progress.kill_pct, 0.0);
    assert_eq!(progress.kill_remaining, 240_000_000);
}

#[test]
fn roster_flags_achievement_against_raw_progress() {
    let dataset = Dataset::from_rows(vec![
        // Done on both fronts.
        snap(START, "1", 80_000_000, 0, 0),
        snap(date(10, 20), "1", 80_000_000, 200_000_000, 400_000),
        // Kills only.
        snap(START, "2", 80_000_000, 0, 0),
        snap(date(10, 20), "2", 80_000_000, 200_000_000, 100_000),
        // Below every band: a zero target never counts as achieved.
        snap(START, "3", 30_000_000, 0, 0),
        snap(date(10, 20), "3", 30_000_000, 1_000_000, 1_000),
    ]);

    let roster = quota_roster(&dataset, START, DeathTargetMode::RateOfStartPower);
    assert_eq!(roster.len(), 3);

    let by_id = |id: &str| roster.iter().find(|e| e.id == id).expect("entry");
    assert!(by_id("1").both_achieved);
    assert!(by_id("2").kill_achieved);
    assert!(!by_id("2").death_achieved);
    assert!(!by_id("3").kill_achieved);
    assert!(!by_id("3").death_achieved);

    assert!(RosterFilter::BothAchieved.keeps(by_id("1")));
    assert!(!RosterFilter::BothAchieved.keeps(by_id("2")));
    assert!(RosterFilter::NotAchieved.keeps(by_id("3")));
}

#[test]
fn roster_tracks_t4_t5_increases_and_missing_alliance() {
    let mut early = snap(START, "9", 80_000_000, 10_000_000, 0);
    early.alliance = String::new();
    let mut late = snap(date(10, 20), "9", 80_000_000, 30_000_000, 0);
    late.alliance = String::new();
    let expected_t4 = late.t4_kills as i64 - early.t4_kills as i64;
    let dataset = Dataset::from_rows(vec![early, late]);

    let roster = quota_roster(&dataset, START, DeathTargetMode::Fixed);
    assert_eq!(roster[0].alliance, "no alliance");
    assert_eq!(roster[0].t4_increase, expected_t4);
}

#[test]
fn roster_sort_orders_by_power() {
    let dataset = Dataset::from_rows(vec![
        snap(START, "1", 50_000_000, 0, 0),
        snap(START, "2", 90_000_000, 0, 0),
    ]);
    let mut roster = quota_roster(&dataset, START, DeathTargetMode::Fixed);
    RosterSort::PowerDesc.apply(&mut roster);
    assert_eq!(roster[0].id, "2");
    RosterSort::PowerAsc.apply(&mut roster);
    assert_eq!(roster[0].id, "1");
}
