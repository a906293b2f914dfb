use chrono::NaiveDate;

/// One dated record of a single player's cumulative stats, coerced to clean
/// numbers at the load boundary so downstream code never touches raw CSV text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerSnapshot {
    pub date: NaiveDate,
    pub id: String,
    pub name: String,
    pub alliance: String,
    pub power: u64,
    pub t4_kills: u64,
    pub t5_kills: u64,
    pub total_kill_points: u64,
    pub dead_troops: u64,
    pub troops_power: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Power,
    T4Kills,
    T5Kills,
    TotalKillPoints,
    DeadTroops,
    TroopsPower,
}

pub const ALL_METRICS: [Metric; 6] = [
    Metric::Power,
    Metric::T4Kills,
    Metric::T5Kills,
    Metric::TotalKillPoints,
    Metric::DeadTroops,
    Metric::TroopsPower,
];

impl Metric {
    pub fn value(self, row: &PlayerSnapshot) -> u64 {
        match self {
            Metric::Power => row.power,
            Metric::T4Kills => row.t4_kills,
            Metric::T5Kills => row.t5_kills,
            Metric::TotalKillPoints => row.total_kill_points,
            Metric::DeadTroops => row.dead_troops,
            Metric::TroopsPower => row.troops_power,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Power => "Power",
            Metric::T4Kills => "T4-Kills",
            Metric::T5Kills => "T5-Kills",
            Metric::TotalKillPoints => "Total Kill Points",
            Metric::DeadTroops => "Dead Troops",
            Metric::TroopsPower => "Troops Power",
        }
    }

    pub fn next(self) -> Metric {
        match self {
            Metric::Power => Metric::T4Kills,
            Metric::T4Kills => Metric::T5Kills,
            Metric::T5Kills => Metric::TotalKillPoints,
            Metric::TotalKillPoints => Metric::DeadTroops,
            Metric::DeadTroops => Metric::TroopsPower,
            Metric::TroopsPower => Metric::Power,
        }
    }
}

/// Defensive counter coercion: the source sheet mixes plain digits,
/// comma-grouped numbers and blanks. Anything unparseable counts as zero.
pub fn parse_count(raw: &str) -> u64 {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return 0;
    }
    let cleaned: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.is_empty() {
        return 0;
    }
    cleaned.parse::<u64>().unwrap_or(0)
}

/// The sheet writes dates as `2025/09/24`, `2025/9/24` or `2025-09-24`
/// depending on which export produced the row.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for fmt in ["%Y/%m/%d", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }
    None
}
