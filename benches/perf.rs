use std::hint::black_box;

use chrono::{Duration, NaiveDate};
use criterion::{criterion_group, criterion_main, Criterion};

use rok_terminal::dataset::Dataset;
use rok_terminal::growth::compute_growth;
use rok_terminal::quota::{quota_roster, DeathTargetMode};
use rok_terminal::snapshot::{Metric, PlayerSnapshot};
use rok_terminal::top_stats::aggregate_top_n;

const PLAYERS: u64 = 500;
const DATES: i64 = 30;

fn campaign_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 24).expect("valid date")
}

fn sample_dataset() -> Dataset {
    let start = campaign_start();
    let mut rows = Vec::with_capacity((PLAYERS as usize) * (DATES as usize));
    for day in 0..DATES {
        let date = start + Duration::days(day);
        for id in 0..PLAYERS {
            let power = 40_000_000 + id * 400_000 + day as u64 * 50_000;
            rows.push(PlayerSnapshot {
                date,
                id: format!("{id}"),
                name: format!("Player {id}"),
                alliance: format!("A{}", id % 7),
                power,
                t4_kills: id * 1_000 + day as u64 * 500,
                t5_kills: id * 400 + day as u64 * 200,
                total_kill_points: id * 100_000 + day as u64 * 2_000_000,
                dead_troops: id * 300 + day as u64 * 10_000,
                troops_power: power / 2,
            });
        }
    }
    Dataset::from_rows(rows)
}

fn bench_top_n(c: &mut Criterion) {
    let dataset = sample_dataset();
    let latest = dataset.latest_date().expect("dates present");
    let rows = dataset.rows_on(latest);

    c.bench_function("top_n_aggregate", |b| {
        b.iter(|| {
            let stat = aggregate_top_n(black_box(&rows), Metric::TotalKillPoints, 300);
            black_box(stat.total);
        })
    });
}

fn bench_growth(c: &mut Criterion) {
    let dataset = sample_dataset();
    let start = dataset.earliest_date().expect("dates present");
    let end = dataset.latest_date().expect("dates present");

    c.bench_function("growth_compute", |b| {
        b.iter(|| {
            let entries = compute_growth(black_box(&dataset), start, end, Metric::Power);
            black_box(entries.len());
        })
    });
}

fn bench_roster(c: &mut Criterion) {
    let dataset = sample_dataset();

    c.bench_function("quota_roster_build", |b| {
        b.iter(|| {
            let roster = quota_roster(
                black_box(&dataset),
                campaign_start(),
                DeathTargetMode::RateOfStartPower,
            );
            black_box(roster.len());
        })
    });
}

fn bench_csv_load(c: &mut Criterion) {
    let start = campaign_start();
    let mut raw = String::from(
        "Date,ID,Name,Alliance,Power,T4-Kills,T5-Kills,Total Kill Points,Dead Troops,Troops Power\n",
    );
    for id in 0..PLAYERS {
        raw.push_str(&format!(
            "{},{id},Player {id},A{},\"{}\",0,0,\"{}\",0,0\n",
            start.format("%Y/%m/%d"),
            id % 7,
            40_000_000 + id * 400_000,
            id * 100_000,
        ));
    }

    c.bench_function("csv_load", |b| {
        b.iter(|| {
            let dataset = Dataset::from_reader(black_box(raw.as_bytes())).expect("valid csv");
            black_box(dataset.len());
        })
    });
}

criterion_group!(perf, bench_top_n, bench_growth, bench_roster, bench_csv_load);
criterion_main!(perf);
