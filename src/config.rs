use std::env;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::quota::DeathTargetMode;
use crate::snapshot::parse_date;
use crate::top_stats::DEFAULT_TOP_N;

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Runtime configuration, read once at startup from the environment
/// (`.env.local` / `.env` are loaded first). The campaign start date is
/// deliberately configuration, not a constant: the source sheets drifted
/// between two hard-coded start dates over time.
#[derive(Debug, Clone)]
pub struct Config {
    pub csv_path: PathBuf,
    pub campaign_start: NaiveDate,
    pub death_mode: DeathTargetMode,
    pub top_n: usize,
    pub page_size: usize,
}

impl Config {
    pub fn from_env() -> Self {
        let csv_path = env::var("ROK_DATA_CSV")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("Master_Data.csv"));

        let campaign_start = env::var("ROK_KVK_START")
            .ok()
            .and_then(|raw| parse_date(&raw))
            .unwrap_or_else(default_campaign_start);

        let death_mode = match env::var("ROK_KVK_DEATH_MODE").ok().as_deref() {
            Some("fixed") | Some("FIXED") => DeathTargetMode::Fixed,
            _ => DeathTargetMode::RateOfStartPower,
        };

        let top_n = env::var("ROK_TOP_N")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_N)
            .max(1);

        let page_size = env::var("ROK_PAGE_SIZE")
            .ok()
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .max(10);

        Self {
            csv_path,
            campaign_start,
            death_mode,
            top_n,
            page_size,
        }
    }
}

fn default_campaign_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 24).unwrap_or_default()
}
