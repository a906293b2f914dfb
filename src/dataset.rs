use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{Duration, NaiveDate};
use serde::Deserialize;

use crate::snapshot::{PlayerSnapshot, parse_count, parse_date};

/// One raw sheet row. Every stat column is read as text and coerced once
/// here; the exports are inconsistent about grouping separators and blanks.
/// Older exports label the date column `Data`, newer ones `Date`.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "Date", alias = "Data", default)]
    date: Option<String>,
    #[serde(rename = "ID", default)]
    id: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Alliance", default)]
    alliance: Option<String>,
    #[serde(rename = "Power", default)]
    power: Option<String>,
    #[serde(rename = "T4-Kills", default)]
    t4_kills: Option<String>,
    #[serde(rename = "T5-Kills", default)]
    t5_kills: Option<String>,
    #[serde(rename = "Total Kill Points", default)]
    total_kill_points: Option<String>,
    #[serde(rename = "Dead Troops", default)]
    dead_troops: Option<String>,
    #[serde(rename = "Troops Power", default)]
    troops_power: Option<String>,
}

impl RawRow {
    fn into_snapshot(self) -> Option<PlayerSnapshot> {
        let date = parse_date(self.date.as_deref()?)?;
        let id = self.id?.trim().to_string();
        if id.is_empty() {
            return None;
        }
        Some(PlayerSnapshot {
            date,
            id,
            name: self.name.unwrap_or_default().trim().to_string(),
            alliance: self.alliance.unwrap_or_default().trim().to_string(),
            power: coerce(&self.power),
            t4_kills: coerce(&self.t4_kills),
            t5_kills: coerce(&self.t5_kills),
            total_kill_points: coerce(&self.total_kill_points),
            dead_troops: coerce(&self.dead_troops),
            troops_power: coerce(&self.troops_power),
        })
    }
}

fn coerce(raw: &Option<String>) -> u64 {
    raw.as_deref().map(parse_count).unwrap_or(0)
}

/// Period presets for the growth screen, mirroring the viewer's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodPreset {
    /// Latest snapshot vs the one before it.
    Latest,
    /// Nearest snapshot to 7 days before the latest.
    Week,
    /// Nearest snapshot to 30 days before the latest.
    Month,
    /// Earliest snapshot vs the latest.
    All,
}

/// The read-only record store: every snapshot from the sheet, deduplicated
/// and indexed by date and by player.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<PlayerSnapshot>,
    by_date: BTreeMap<NaiveDate, Vec<usize>>,
    by_player: HashMap<String, Vec<usize>>,
}

impl Dataset {
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open data csv {}", path.display()))?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows: Vec<PlayerSnapshot> = Vec::new();
        // One snapshot per player per day; on duplicates the last row in
        // input order wins, replacing in place to keep ordering stable.
        let mut seen: HashMap<(NaiveDate, String), usize> = HashMap::new();
        for record in csv_reader.deserialize::<RawRow>() {
            let record = record.context("decode csv row")?;
            let Some(snapshot) = record.into_snapshot() else {
                continue;
            };
            let key = (snapshot.date, snapshot.id.clone());
            match seen.get(&key) {
                Some(&idx) => rows[idx] = snapshot,
                None => {
                    seen.insert(key, rows.len());
                    rows.push(snapshot);
                }
            }
        }
        if rows.is_empty() {
            return Err(anyhow!("data csv contains no usable rows"));
        }
        Ok(Self::from_rows(rows))
    }

    pub fn from_rows(mut rows: Vec<PlayerSnapshot>) -> Self {
        // Stable sort: rows within one date keep their input order, which is
        // what makes top-N tie-breaking deterministic.
        rows.sort_by_key(|row| row.date);

        let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        let mut by_player: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, row) in rows.iter().enumerate() {
            by_date.entry(row.date).or_default().push(idx);
            by_player.entry(row.id.clone()).or_default().push(idx);
        }

        Self {
            rows,
            by_date,
            by_player,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn player_count(&self) -> usize {
        self.by_player.len()
    }

    /// All distinct dates, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.by_date.keys().copied().collect()
    }

    pub fn earliest_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next().copied()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.by_date.keys().next_back().copied()
    }

    /// Snapshots taken on exactly `date`, in input order.
    pub fn rows_on(&self, date: NaiveDate) -> Vec<&PlayerSnapshot> {
        self.by_date
            .get(&date)
            .map(|idxs| idxs.iter().map(|&i| &self.rows[i]).collect())
            .unwrap_or_default()
    }

    /// A player's full history sorted by date ascending; may have gaps.
    pub fn player_history(&self, id: &str) -> Vec<&PlayerSnapshot> {
        self.by_player
            .get(id)
            .map(|idxs| idxs.iter().map(|&i| &self.rows[i]).collect())
            .unwrap_or_default()
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &str> {
        self.by_player.keys().map(String::as_str)
    }

    /// Resolve a free-text query (substring of name or id, case-insensitive)
    /// to the matching player with the most recent snapshot.
    pub fn find_player(&self, query: &str) -> Option<&PlayerSnapshot> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.rows
            .iter()
            .filter(|row| {
                row.name.to_lowercase().contains(&needle)
                    || row.id.to_lowercase().contains(&needle)
            })
            .max_by_key(|row| row.date)
    }

    /// Resolve a preset to a (start, end) date pair over the available dates.
    pub fn preset_range(&self, preset: PeriodPreset) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.dates();
        let latest = *dates.last()?;
        let start = match preset {
            PeriodPreset::Latest => {
                if dates.len() >= 2 {
                    dates[dates.len() - 2]
                } else {
                    dates[0]
                }
            }
            PeriodPreset::Week => nearest_date(&dates, latest - Duration::days(7))?,
            PeriodPreset::Month => nearest_date(&dates, latest - Duration::days(30))?,
            PeriodPreset::All => dates[0],
        };
        Some((start, latest))
    }
}

fn nearest_date(dates: &[NaiveDate], target: NaiveDate) -> Option<NaiveDate> {
    dates
        .iter()
        .copied()
        .min_by_key(|d| (*d - target).num_days().abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_row_without_id_is_skipped() {
        let row = RawRow {
            date: Some("2025/09/24".to_string()),
            id: Some("  ".to_string()),
            name: Some("Ghost".to_string()),
            alliance: None,
            power: None,
            t4_kills: None,
            t5_kills: None,
            total_kill_points: None,
            dead_troops: None,
            troops_power: None,
        };
        assert!(row.into_snapshot().is_none());
    }

    #[test]
    fn raw_row_coerces_grouped_numbers() {
        let row = RawRow {
            date: Some("2025-09-24".to_string()),
            id: Some("42".to_string()),
            name: Some("Kara".to_string()),
            alliance: Some("ABC".to_string()),
            power: Some("85,123,456".to_string()),
            t4_kills: Some("".to_string()),
            t5_kills: None,
            total_kill_points: Some("junk".to_string()),
            dead_troops: Some("430,100".to_string()),
            troops_power: Some("12000".to_string()),
        };
        let snapshot = row.into_snapshot().unwrap();
        assert_eq!(snapshot.power, 85_123_456);
        assert_eq!(snapshot.t4_kills, 0);
        assert_eq!(snapshot.total_kill_points, 0);
        assert_eq!(snapshot.dead_troops, 430_100);
        assert_eq!(snapshot.troops_power, 12_000);
    }
}
