use chrono::NaiveDate;

use crate::snapshot::{Metric, PlayerSnapshot};

/// A player's raw metric history, ascending by date.
pub fn metric_series(history: &[&PlayerSnapshot], metric: Metric) -> Vec<(NaiveDate, u64)> {
    let mut points: Vec<(NaiveDate, u64)> = history
        .iter()
        .map(|row| (row.date, metric.value(row)))
        .collect();
    points.sort_by_key(|(date, _)| *date);
    points
}

/// Daily cumulative kill/death increase since campaign start, baselined at
/// the first snapshot on or after the start date. Signed: a reset account
/// shows negative progress instead of breaking the chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPoint {
    pub date: NaiveDate,
    pub kill_progress: i64,
    pub death_progress: i64,
}

pub fn progress_series(
    history: &[&PlayerSnapshot],
    campaign_start: NaiveDate,
) -> Vec<ProgressPoint> {
    let mut in_campaign: Vec<&PlayerSnapshot> = history
        .iter()
        .copied()
        .filter(|row| row.date >= campaign_start)
        .collect();
    in_campaign.sort_by_key(|row| row.date);

    let Some(base) = in_campaign.first() else {
        return Vec::new();
    };
    let base_kills = base.total_kill_points as i64;
    let base_deaths = base.dead_troops as i64;

    in_campaign
        .iter()
        .map(|row| ProgressPoint {
            date: row.date,
            kill_progress: row.total_kill_points as i64 - base_kills,
            death_progress: row.dead_troops as i64 - base_deaths,
        })
        .collect()
}
