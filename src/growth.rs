use std::collections::HashMap;

use chrono::NaiveDate;

use crate::dataset::Dataset;
use crate::snapshot::Metric;

/// One player's change in a metric between two snapshot dates.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthEntry {
    pub id: String,
    pub name: String,
    pub alliance: String,
    pub start_value: u64,
    pub end_value: u64,
    pub difference: i64,
    /// Percent growth relative to the start value; 0 when the start is 0.
    pub growth_rate: f64,
    pub daily_average: f64,
    pub days: i64,
}

/// Join the start-date and end-date partitions by player id and emit one
/// entry per player present in both. Players missing from the end partition
/// are silently excluded; an empty partition on either side yields an empty
/// result rather than an error.
pub fn compute_growth(
    dataset: &Dataset,
    start: NaiveDate,
    end: NaiveDate,
    metric: Metric,
) -> Vec<GrowthEntry> {
    let start_rows = dataset.rows_on(start);
    let end_rows = dataset.rows_on(end);
    if start_rows.is_empty() || end_rows.is_empty() {
        return Vec::new();
    }

    let end_by_id: HashMap<&str, &crate::snapshot::PlayerSnapshot> =
        end_rows.iter().map(|row| (row.id.as_str(), *row)).collect();

    let days = (end - start).num_days().max(1);

    let mut out = Vec::with_capacity(start_rows.len());
    for start_row in &start_rows {
        let Some(end_row) = end_by_id.get(start_row.id.as_str()) else {
            continue;
        };
        let start_value = metric.value(start_row);
        let end_value = metric.value(end_row);
        let difference = end_value as i64 - start_value as i64;
        let growth_rate = if start_value > 0 {
            difference as f64 / start_value as f64 * 100.0
        } else {
            0.0
        };
        // Display strings prefer the end snapshot; players rename and hop
        // alliances between dates.
        let name = if end_row.name.is_empty() {
            start_row.name.clone()
        } else {
            end_row.name.clone()
        };
        let alliance = if end_row.alliance.is_empty() {
            start_row.alliance.clone()
        } else {
            end_row.alliance.clone()
        };
        out.push(GrowthEntry {
            id: start_row.id.clone(),
            name,
            alliance,
            start_value,
            end_value,
            difference,
            growth_rate,
            daily_average: difference as f64 / days as f64,
            days,
        });
    }
    out
}

/// Sort orders offered by the growth screen. These shape presentation only;
/// the raw entry list from `compute_growth` is unordered by contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthSort {
    /// Largest absolute change first.
    Amount,
    /// Largest absolute percent change first.
    Rate,
    /// Largest end-of-period value first.
    Current,
}

impl GrowthSort {
    pub fn label(self) -> &'static str {
        match self {
            GrowthSort::Amount => "AMOUNT",
            GrowthSort::Rate => "RATE",
            GrowthSort::Current => "CURRENT",
        }
    }

    pub fn next(self) -> GrowthSort {
        match self {
            GrowthSort::Amount => GrowthSort::Rate,
            GrowthSort::Rate => GrowthSort::Current,
            GrowthSort::Current => GrowthSort::Amount,
        }
    }
}

/// Direction filter: everything, growers only, or decliners only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthFilter {
    All,
    GrowthOnly,
    DeclineOnly,
}

impl GrowthFilter {
    pub fn label(self) -> &'static str {
        match self {
            GrowthFilter::All => "ALL",
            GrowthFilter::GrowthOnly => "GROWTH",
            GrowthFilter::DeclineOnly => "DECLINE",
        }
    }

    pub fn next(self) -> GrowthFilter {
        match self {
            GrowthFilter::All => GrowthFilter::GrowthOnly,
            GrowthFilter::GrowthOnly => GrowthFilter::DeclineOnly,
            GrowthFilter::DeclineOnly => GrowthFilter::All,
        }
    }

    pub fn keeps(self, entry: &GrowthEntry) -> bool {
        match self {
            GrowthFilter::All => true,
            GrowthFilter::GrowthOnly => entry.difference > 0,
            GrowthFilter::DeclineOnly => entry.difference < 0,
        }
    }
}

/// Apply direction filter, sort order and limit to a raw growth list.
pub fn rank_growth(
    entries: &[GrowthEntry],
    filter: GrowthFilter,
    sort: GrowthSort,
    limit: usize,
) -> Vec<GrowthEntry> {
    let mut kept: Vec<GrowthEntry> = entries
        .iter()
        .filter(|entry| filter.keeps(entry))
        .cloned()
        .collect();
    match sort {
        GrowthSort::Amount => kept.sort_by(|a, b| b.difference.abs().cmp(&a.difference.abs())),
        GrowthSort::Rate => kept.sort_by(|a, b| {
            b.growth_rate
                .abs()
                .partial_cmp(&a.growth_rate.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        GrowthSort::Current => kept.sort_by(|a, b| b.end_value.cmp(&a.end_value)),
    }
    kept.truncate(limit);
    kept
}

/// Case-insensitive substring match over name, id and alliance.
pub fn matches_search(entry: &GrowthEntry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    entry.name.to_lowercase().contains(needle)
        || entry.id.to_lowercase().contains(needle)
        || entry.alliance.to_lowercase().contains(needle)
}
