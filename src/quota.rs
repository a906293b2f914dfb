use chrono::NaiveDate;
use once_cell::sync::Lazy;

use crate::dataset::Dataset;
use crate::snapshot::PlayerSnapshot;

/// A power-band rule from the KVK quota sheet. Bands are contiguous and
/// non-overlapping; the top band is open-ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuotaBand {
    pub min_power: u64,
    /// Inclusive upper bound; `None` means unbounded.
    pub max_power: Option<u64>,
    pub kill_target: u64,
    /// Fixed death target used in `Fixed` mode.
    pub death_target: u64,
    /// Death-per-power rate used in `RateOfStartPower` mode.
    pub death_rate: f64,
}

impl QuotaBand {
    pub fn contains(&self, power: u64) -> bool {
        power >= self.min_power && self.max_power.is_none_or(|max| power <= max)
    }

    /// Short range label for table rows, e.g. `80M-84.9M` or `200M+`.
    pub fn label(&self) -> String {
        match self.max_power {
            Some(max) => format!(
                "{}M-{:.1}M",
                self.min_power / 1_000_000,
                max as f64 / 1_000_000.0
            ),
            None => format!("{}M+", self.min_power / 1_000_000),
        }
    }
}

pub static QUOTA_BANDS: Lazy<Vec<QuotaBand>> = Lazy::new(|| {
    fn band(
        min_power: u64,
        max_power: Option<u64>,
        kill_target: u64,
        death_target: u64,
        death_rate: f64,
    ) -> QuotaBand {
        QuotaBand {
            min_power,
            max_power,
            kill_target,
            death_target,
            death_rate,
        }
    }
    vec![
        band(45_000_000, Some(59_999_999), 75_000_000, 198_000, 0.0033),
        band(60_000_000, Some(64_999_999), 150_000_000, 214_500, 0.0033),
        band(65_000_000, Some(69_999_999), 150_000_000, 231_000, 0.0033),
        band(70_000_000, Some(74_999_999), 187_500_000, 315_000, 0.0042),
        band(75_000_000, Some(79_999_999), 187_500_000, 336_000, 0.0042),
        band(80_000_000, Some(84_999_999), 200_000_000, 425_000, 0.0050),
        band(85_000_000, Some(89_999_999), 200_000_000, 450_000, 0.0050),
        band(90_000_000, Some(94_999_999), 300_000_000, 551_000, 0.0058),
        band(95_000_000, Some(99_999_999), 300_000_000, 580_000, 0.0058),
        band(100_000_000, Some(149_999_999), 600_000_000, 1_005_000, 0.0067),
        band(150_000_000, Some(199_999_999), 600_000_000, 1_340_000, 0.0067),
        band(200_000_000, None, 600_000_000, 1_340_000, 0.0067),
    ]
});

pub fn band_for_power(power: u64) -> Option<&'static QuotaBand> {
    QUOTA_BANDS.iter().find(|band| band.contains(power))
}

/// Label for any power value, including below-band accounts.
pub fn band_label(power: u64) -> String {
    match band_for_power(power) {
        Some(band) => band.label(),
        None => "under 45M".to_string(),
    }
}

/// How the death target is derived. Selected by configuration, never
/// inferred: the kill target is always the band's static value, while the
/// death target is either static too or scaled from the player's power at
/// campaign start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathTargetMode {
    Fixed,
    RateOfStartPower,
}

impl DeathTargetMode {
    pub fn label(self) -> &'static str {
        match self {
            DeathTargetMode::Fixed => "FIXED",
            DeathTargetMode::RateOfStartPower => "RATE",
        }
    }
}

fn death_target_for(band: &QuotaBand, mode: DeathTargetMode, start_power: u64) -> u64 {
    match mode {
        DeathTargetMode::Fixed => band.death_target,
        DeathTargetMode::RateOfStartPower => (start_power as f64 * band.death_rate).round() as u64,
    }
}

/// Quota progress for one player between campaign start and their latest
/// snapshot. Zero targets mean "no applicable quota" (power below every
/// band), not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaProgress {
    pub start: PlayerSnapshot,
    pub current: PlayerSnapshot,
    pub band: Option<QuotaBand>,
    pub kill_target: u64,
    pub death_target: u64,
    /// Raw deltas since campaign start; may be negative, never clamped.
    pub kill_progress: i64,
    pub death_progress: i64,
    /// Percentages clamped to [0, 100]; 0 when the target is 0.
    pub kill_pct: f64,
    pub death_pct: f64,
    pub overall_pct: f64,
    pub kill_remaining: u64,
    pub death_remaining: u64,
    /// True when the campaign-start snapshot was missing and the earliest
    /// available snapshot served as the baseline instead.
    pub used_fallback_start: bool,
}

fn pct_toward(progress: i64, target: u64) -> f64 {
    if target == 0 {
        return 0.0;
    }
    (progress as f64 / target as f64 * 100.0).clamp(0.0, 100.0)
}

fn remaining(target: u64, progress: i64) -> u64 {
    let left = target as i64 - progress;
    if left > 0 { left as u64 } else { 0 }
}

/// Compute quota progress from a player's full history. Returns `None` only
/// for an empty history; every other edge case degrades to zero-valued or
/// flagged fields. The band is resolved from the *current* power, while the
/// dynamic death target scales from the *start* power.
pub fn compute_quota_progress(
    history: &[&PlayerSnapshot],
    campaign_start: NaiveDate,
    mode: DeathTargetMode,
) -> Option<QuotaProgress> {
    let current = *history.iter().max_by_key(|row| row.date)?;
    let start = history
        .iter()
        .find(|row| row.date == campaign_start)
        .copied();
    let used_fallback_start = start.is_none();
    let start = match start {
        Some(row) => row,
        None => *history.iter().min_by_key(|row| row.date)?,
    };

    let band = band_for_power(current.power);
    let kill_target = band.map(|b| b.kill_target).unwrap_or(0);
    let death_target = band
        .map(|b| death_target_for(b, mode, start.power))
        .unwrap_or(0);

    let kill_progress = current.total_kill_points as i64 - start.total_kill_points as i64;
    let death_progress = current.dead_troops as i64 - start.dead_troops as i64;

    let kill_pct = pct_toward(kill_progress, kill_target);
    let death_pct = pct_toward(death_progress, death_target);

    Some(QuotaProgress {
        start: start.clone(),
        current: current.clone(),
        band: band.copied(),
        kill_target,
        death_target,
        kill_progress,
        death_progress,
        kill_pct,
        death_pct,
        overall_pct: (kill_pct + death_pct) / 2.0,
        kill_remaining: remaining(kill_target, kill_progress),
        death_remaining: remaining(death_target, death_progress),
        used_fallback_start,
    })
}

/// One row of the alliance-wide quota roster.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
    pub alliance: String,
    pub power: u64,
    pub band_label: String,
    pub t4_increase: i64,
    pub t5_increase: i64,
    pub progress: QuotaProgress,
    /// Achievement compares raw progress against the target, so it stays
    /// meaningful past the clamped 100% mark.
    pub kill_achieved: bool,
    pub death_achieved: bool,
    pub both_achieved: bool,
}

/// Build the quota roster: one consolidated entry per player with any
/// history. Players whose every snapshot predates the campaign still get an
/// entry (flagged via `used_fallback_start`), mirroring the checker.
pub fn quota_roster(
    dataset: &Dataset,
    campaign_start: NaiveDate,
    mode: DeathTargetMode,
) -> Vec<RosterEntry> {
    let mut out = Vec::with_capacity(dataset.player_count());
    let mut ids: Vec<&str> = dataset.player_ids().collect();
    ids.sort_unstable();
    for id in ids {
        let history = dataset.player_history(id);
        let Some(progress) = compute_quota_progress(&history, campaign_start, mode) else {
            continue;
        };
        let t4_increase = progress.current.t4_kills as i64 - progress.start.t4_kills as i64;
        let t5_increase = progress.current.t5_kills as i64 - progress.start.t5_kills as i64;
        let kill_achieved =
            progress.kill_target > 0 && progress.kill_progress >= progress.kill_target as i64;
        let death_achieved =
            progress.death_target > 0 && progress.death_progress >= progress.death_target as i64;
        let alliance = if progress.current.alliance.is_empty() {
            "no alliance".to_string()
        } else {
            progress.current.alliance.clone()
        };
        out.push(RosterEntry {
            id: id.to_string(),
            name: progress.current.name.clone(),
            alliance,
            power: progress.current.power,
            band_label: band_label(progress.current.power),
            t4_increase,
            t5_increase,
            kill_achieved,
            death_achieved,
            both_achieved: kill_achieved && death_achieved,
            progress,
        });
    }
    out
}

/// Achievement filter for the roster screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterFilter {
    All,
    BothAchieved,
    KillAchieved,
    DeathAchieved,
    NotAchieved,
}

impl RosterFilter {
    pub fn label(self) -> &'static str {
        match self {
            RosterFilter::All => "ALL",
            RosterFilter::BothAchieved => "DONE",
            RosterFilter::KillAchieved => "KILL",
            RosterFilter::DeathAchieved => "DEATH",
            RosterFilter::NotAchieved => "BEHIND",
        }
    }

    pub fn next(self) -> RosterFilter {
        match self {
            RosterFilter::All => RosterFilter::BothAchieved,
            RosterFilter::BothAchieved => RosterFilter::KillAchieved,
            RosterFilter::KillAchieved => RosterFilter::DeathAchieved,
            RosterFilter::DeathAchieved => RosterFilter::NotAchieved,
            RosterFilter::NotAchieved => RosterFilter::All,
        }
    }

    pub fn keeps(self, entry: &RosterEntry) -> bool {
        match self {
            RosterFilter::All => true,
            RosterFilter::BothAchieved => entry.both_achieved,
            RosterFilter::KillAchieved => entry.kill_achieved,
            RosterFilter::DeathAchieved => entry.death_achieved,
            RosterFilter::NotAchieved => !entry.both_achieved,
        }
    }
}

/// Sort orders for the roster screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterSort {
    PowerDesc,
    PowerAsc,
    KillProgress,
    DeathProgress,
    Name,
}

impl RosterSort {
    pub fn label(self) -> &'static str {
        match self {
            RosterSort::PowerDesc => "POWER v",
            RosterSort::PowerAsc => "POWER ^",
            RosterSort::KillProgress => "KILL%",
            RosterSort::DeathProgress => "DEATH%",
            RosterSort::Name => "NAME",
        }
    }

    pub fn next(self) -> RosterSort {
        match self {
            RosterSort::PowerDesc => RosterSort::PowerAsc,
            RosterSort::PowerAsc => RosterSort::KillProgress,
            RosterSort::KillProgress => RosterSort::DeathProgress,
            RosterSort::DeathProgress => RosterSort::Name,
            RosterSort::Name => RosterSort::PowerDesc,
        }
    }

    pub fn apply(self, entries: &mut [RosterEntry]) {
        match self {
            RosterSort::PowerDesc => entries.sort_by(|a, b| b.power.cmp(&a.power)),
            RosterSort::PowerAsc => entries.sort_by(|a, b| a.power.cmp(&b.power)),
            RosterSort::KillProgress => entries.sort_by(|a, b| {
                b.progress
                    .kill_pct
                    .partial_cmp(&a.progress.kill_pct)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            RosterSort::DeathProgress => entries.sort_by(|a, b| {
                b.progress
                    .death_pct
                    .partial_cmp(&a.progress.death_pct)
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            RosterSort::Name => entries.sort_by(|a, b| a.name.cmp(&b.name)),
        }
    }
}

/// Case-insensitive substring match over name, id and alliance.
pub fn roster_matches_search(entry: &RosterEntry, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    entry.name.to_lowercase().contains(needle)
        || entry.id.to_lowercase().contains(needle)
        || entry.alliance.to_lowercase().contains(needle)
}
