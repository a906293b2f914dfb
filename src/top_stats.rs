use chrono::NaiveDate;

use crate::dataset::Dataset;
use crate::snapshot::{Metric, PlayerSnapshot};

pub const DEFAULT_TOP_N: usize = 300;

/// Aggregate over the highest-power slice of one day's snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopNStat {
    pub total: u64,
    pub average: f64,
    pub count: usize,
}

impl TopNStat {
    pub const EMPTY: TopNStat = TopNStat {
        total: 0,
        average: 0.0,
        count: 0,
    };
}

/// Rank `rows` descending by power, take the first `n`, and sum `metric`
/// over that slice. Ranking is always by power even when the summed metric
/// differs ("top 300 by power, summed T4 kills"). Ties keep input order so
/// repeated calls on the same input agree.
pub fn aggregate_top_n(rows: &[&PlayerSnapshot], metric: Metric, n: usize) -> TopNStat {
    if rows.is_empty() || n == 0 {
        return TopNStat::EMPTY;
    }
    let mut ranked: Vec<&PlayerSnapshot> = rows.to_vec();
    ranked.sort_by(|a, b| b.power.cmp(&a.power));
    ranked.truncate(n);

    let total: u64 = ranked.iter().map(|row| metric.value(row)).sum();
    let count = ranked.len();
    TopNStat {
        total,
        average: total as f64 / count as f64,
        count,
    }
}

/// The per-date series behind the top-stats chart: one aggregate per
/// available date, ascending.
pub fn top_n_series(dataset: &Dataset, metric: Metric, n: usize) -> Vec<(NaiveDate, TopNStat)> {
    dataset
        .dates()
        .into_iter()
        .map(|date| {
            let rows = dataset.rows_on(date);
            (date, aggregate_top_n(&rows, metric, n))
        })
        .collect()
}
