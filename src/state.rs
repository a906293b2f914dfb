use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::config::Config;
use crate::dataset::{Dataset, PeriodPreset};
use crate::growth::{self, GrowthEntry, GrowthFilter, GrowthSort};
use crate::quota::{
    self, DeathTargetMode, QuotaProgress, RosterEntry, RosterFilter, RosterSort, quota_roster,
};
use crate::snapshot::{Metric, PlayerSnapshot};
use crate::top_stats::{TopNStat, top_n_series};
use crate::trend::{ProgressPoint, metric_series, progress_series};

const MAX_LOGS: usize = 200;
const GROWTH_LIMITS: [usize; 4] = [50, 100, 300, usize::MAX];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Data,
    Growth,
    Trends,
    TopStats,
    Quota,
}

pub const ALL_TABS: [Tab; 5] = [
    Tab::Data,
    Tab::Growth,
    Tab::Trends,
    Tab::TopStats,
    Tab::Quota,
];

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Data => "Data",
            Tab::Growth => "Growth",
            Tab::Trends => "Trends",
            Tab::TopStats => "Top 300",
            Tab::Quota => "KVK Quota",
        }
    }

    pub fn index(self) -> usize {
        ALL_TABS.iter().position(|t| *t == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaView {
    Checker,
    Roster,
}

/// Sortable columns of the data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataColumn {
    Id,
    Name,
    Alliance,
    Power,
    T4Kills,
    T5Kills,
    TotalKillPoints,
    DeadTroops,
    TroopsPower,
}

impl DataColumn {
    pub fn label(self) -> &'static str {
        match self {
            DataColumn::Id => "ID",
            DataColumn::Name => "Name",
            DataColumn::Alliance => "Alliance",
            DataColumn::Power => "Power",
            DataColumn::T4Kills => "T4-Kills",
            DataColumn::T5Kills => "T5-Kills",
            DataColumn::TotalKillPoints => "Kill Points",
            DataColumn::DeadTroops => "Dead",
            DataColumn::TroopsPower => "Troops Pwr",
        }
    }

    pub fn next(self) -> DataColumn {
        match self {
            DataColumn::Id => DataColumn::Name,
            DataColumn::Name => DataColumn::Alliance,
            DataColumn::Alliance => DataColumn::Power,
            DataColumn::Power => DataColumn::T4Kills,
            DataColumn::T4Kills => DataColumn::T5Kills,
            DataColumn::T5Kills => DataColumn::TotalKillPoints,
            DataColumn::TotalKillPoints => DataColumn::DeadTroops,
            DataColumn::DeadTroops => DataColumn::TroopsPower,
            DataColumn::TroopsPower => DataColumn::Id,
        }
    }
}

/// A resolved player for the trends and quota checker screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedPlayer {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub dataset: Dataset,
    pub config: Config,
    pub tab: Tab,
    pub help_overlay: bool,
    pub logs: VecDeque<String>,
    pub search: String,
    pub search_active: bool,

    // Data tab.
    pub data_date_idx: usize,
    pub data_sort: DataColumn,
    pub data_sort_desc: bool,
    pub data_page: usize,

    // Growth tab.
    pub growth_start_idx: usize,
    pub growth_end_idx: usize,
    pub growth_metric: Metric,
    pub growth_sort: GrowthSort,
    pub growth_filter: GrowthFilter,
    pub growth_limit_idx: usize,
    pub growth_entries: Vec<GrowthEntry>,
    pub growth_scroll: usize,

    // Trends tab.
    pub trend_player: Option<SelectedPlayer>,
    pub trend_metric: Metric,
    pub trend_series: Vec<(NaiveDate, u64)>,

    // Top stats tab.
    pub top_metric: Metric,
    pub top_series: Vec<(NaiveDate, TopNStat)>,
    pub top_scroll: usize,

    // Quota tab.
    pub quota_view: QuotaView,
    pub quota_player: Option<SelectedPlayer>,
    pub quota_progress: Option<QuotaProgress>,
    pub quota_series: Vec<ProgressPoint>,
    pub roster: Vec<RosterEntry>,
    pub roster_filter: RosterFilter,
    pub roster_sort: RosterSort,
    pub roster_scroll: usize,
}

impl AppState {
    pub fn new(dataset: Dataset, config: Config) -> Self {
        let dates = dataset.dates();
        let latest_idx = dates.len().saturating_sub(1);
        let growth_start_idx = dates.len().saturating_sub(2);

        let mut state = Self {
            dataset,
            config,
            tab: Tab::Data,
            help_overlay: false,
            logs: VecDeque::with_capacity(MAX_LOGS),
            search: String::new(),
            search_active: false,
            data_date_idx: latest_idx,
            data_sort: DataColumn::Power,
            data_sort_desc: true,
            data_page: 0,
            growth_start_idx,
            growth_end_idx: latest_idx,
            growth_metric: Metric::Power,
            growth_sort: GrowthSort::Amount,
            growth_filter: GrowthFilter::All,
            growth_limit_idx: 0,
            growth_entries: Vec::new(),
            growth_scroll: 0,
            trend_player: None,
            trend_metric: Metric::Power,
            trend_series: Vec::new(),
            top_metric: Metric::Power,
            top_series: Vec::new(),
            top_scroll: 0,
            quota_view: QuotaView::Checker,
            quota_player: None,
            quota_progress: None,
            quota_series: Vec::new(),
            roster: Vec::new(),
            roster_filter: RosterFilter::All,
            roster_sort: RosterSort::PowerDesc,
            roster_scroll: 0,
        };
        state.refresh_growth();
        state.refresh_top();
        state.refresh_roster();
        state
    }

    pub fn push_log<S: Into<String>>(&mut self, line: S) {
        if self.logs.len() >= MAX_LOGS {
            self.logs.pop_front();
        }
        self.logs.push_back(line.into());
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.dataset.dates()
    }

    pub fn search_needle(&self) -> String {
        self.search.trim().to_lowercase()
    }

    // ----- tab switching -----

    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.search_active = false;
        }
    }

    pub fn next_tab(&mut self) {
        let idx = (self.tab.index() + 1) % ALL_TABS.len();
        self.set_tab(ALL_TABS[idx]);
    }

    // ----- data tab -----

    pub fn data_date(&self) -> Option<NaiveDate> {
        self.dates().get(self.data_date_idx).copied()
    }

    /// Rows of the selected date, search-filtered and column-sorted.
    pub fn data_rows(&self) -> Vec<&PlayerSnapshot> {
        let Some(date) = self.data_date() else {
            return Vec::new();
        };
        let needle = self.search_needle();
        let mut rows: Vec<&PlayerSnapshot> = self
            .dataset
            .rows_on(date)
            .into_iter()
            .filter(|row| {
                needle.is_empty()
                    || row.name.to_lowercase().contains(&needle)
                    || row.id.to_lowercase().contains(&needle)
                    || row.alliance.to_lowercase().contains(&needle)
            })
            .collect();
        sort_data_rows(&mut rows, self.data_sort, self.data_sort_desc);
        rows
    }

    pub fn data_page_count(&self) -> usize {
        let total = self.data_rows().len();
        if total == 0 {
            1
        } else {
            total.div_ceil(self.config.page_size)
        }
    }

    pub fn data_next_page(&mut self) {
        if self.data_page + 1 < self.data_page_count() {
            self.data_page += 1;
        }
    }

    pub fn data_prev_page(&mut self) {
        self.data_page = self.data_page.saturating_sub(1);
    }

    pub fn data_next_date(&mut self) {
        if self.data_date_idx + 1 < self.dates().len() {
            self.data_date_idx += 1;
            self.data_page = 0;
        }
    }

    pub fn data_prev_date(&mut self) {
        if self.data_date_idx > 0 {
            self.data_date_idx -= 1;
            self.data_page = 0;
        }
    }

    pub fn data_cycle_sort(&mut self) {
        self.data_sort = self.data_sort.next();
        self.data_page = 0;
    }

    pub fn data_toggle_order(&mut self) {
        self.data_sort_desc = !self.data_sort_desc;
        self.data_page = 0;
    }

    // ----- growth tab -----

    pub fn growth_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self.dates();
        Some((
            *dates.get(self.growth_start_idx)?,
            *dates.get(self.growth_end_idx)?,
        ))
    }

    pub fn growth_limit(&self) -> usize {
        GROWTH_LIMITS[self.growth_limit_idx % GROWTH_LIMITS.len()]
    }

    pub fn growth_limit_label(&self) -> String {
        let limit = self.growth_limit();
        if limit == usize::MAX {
            "ALL".to_string()
        } else {
            limit.to_string()
        }
    }

    pub fn refresh_growth(&mut self) {
        self.growth_entries = match self.growth_range() {
            Some((start, end)) => {
                growth::compute_growth(&self.dataset, start, end, self.growth_metric)
            }
            None => Vec::new(),
        };
        self.growth_scroll = 0;
    }

    /// Ranked, limited and search-filtered growth rows for display.
    pub fn growth_rows(&self) -> Vec<GrowthEntry> {
        let ranked = growth::rank_growth(
            &self.growth_entries,
            self.growth_filter,
            self.growth_sort,
            self.growth_limit(),
        );
        let needle = self.search_needle();
        ranked
            .into_iter()
            .filter(|entry| growth::matches_search(entry, &needle))
            .collect()
    }

    pub fn growth_apply_preset(&mut self, preset: PeriodPreset) {
        let Some((start, end)) = self.dataset.preset_range(preset) else {
            return;
        };
        let dates = self.dates();
        if let Some(start_idx) = dates.iter().position(|d| *d == start) {
            self.growth_start_idx = start_idx;
        }
        if let Some(end_idx) = dates.iter().position(|d| *d == end) {
            self.growth_end_idx = end_idx;
        }
        self.refresh_growth();
    }

    pub fn growth_shift_start(&mut self, forward: bool) {
        let last = self.dates().len().saturating_sub(1);
        self.growth_start_idx = shift_index(self.growth_start_idx, forward, last);
        self.refresh_growth();
    }

    pub fn growth_shift_end(&mut self, forward: bool) {
        let last = self.dates().len().saturating_sub(1);
        self.growth_end_idx = shift_index(self.growth_end_idx, forward, last);
        self.refresh_growth();
    }

    pub fn growth_cycle_metric(&mut self) {
        self.growth_metric = self.growth_metric.next();
        self.refresh_growth();
    }

    pub fn growth_cycle_sort(&mut self) {
        self.growth_sort = self.growth_sort.next();
        self.growth_scroll = 0;
    }

    pub fn growth_cycle_filter(&mut self) {
        self.growth_filter = self.growth_filter.next();
        self.growth_scroll = 0;
    }

    pub fn growth_cycle_limit(&mut self) {
        self.growth_limit_idx = (self.growth_limit_idx + 1) % GROWTH_LIMITS.len();
        self.growth_scroll = 0;
    }

    // ----- trends tab -----

    pub fn trend_cycle_metric(&mut self) {
        self.trend_metric = self.trend_metric.next();
        self.refresh_trend();
    }

    pub fn refresh_trend(&mut self) {
        self.trend_series = match &self.trend_player {
            Some(player) => {
                let history = self.dataset.player_history(&player.id);
                metric_series(&history, self.trend_metric)
            }
            None => Vec::new(),
        };
    }

    // ----- top stats tab -----

    pub fn top_cycle_metric(&mut self) {
        self.top_metric = self.top_metric.next();
        self.refresh_top();
    }

    pub fn refresh_top(&mut self) {
        self.top_series = top_n_series(&self.dataset, self.top_metric, self.config.top_n);
        self.top_scroll = 0;
    }

    // ----- quota tab -----

    pub fn toggle_quota_view(&mut self) {
        self.quota_view = match self.quota_view {
            QuotaView::Checker => QuotaView::Roster,
            QuotaView::Roster => QuotaView::Checker,
        };
    }

    pub fn refresh_roster(&mut self) {
        self.roster = quota_roster(
            &self.dataset,
            self.config.campaign_start,
            self.config.death_mode,
        );
        self.roster_scroll = 0;
    }

    /// Filtered and sorted roster rows for display.
    pub fn roster_rows(&self) -> Vec<RosterEntry> {
        let needle = self.search_needle();
        let mut rows: Vec<RosterEntry> = self
            .roster
            .iter()
            .filter(|entry| self.roster_filter.keeps(entry))
            .filter(|entry| quota::roster_matches_search(entry, &needle))
            .cloned()
            .collect();
        self.roster_sort.apply(&mut rows);
        rows
    }

    pub fn roster_cycle_filter(&mut self) {
        self.roster_filter = self.roster_filter.next();
        self.roster_scroll = 0;
    }

    pub fn roster_cycle_sort(&mut self) {
        self.roster_sort = self.roster_sort.next();
        self.roster_scroll = 0;
    }

    pub fn death_mode(&self) -> DeathTargetMode {
        self.config.death_mode
    }

    // ----- search handling -----

    pub fn toggle_search(&mut self) {
        self.search_active = !self.search_active;
    }

    pub fn search_push(&mut self, ch: char) {
        self.search.push(ch);
        self.on_search_changed();
    }

    pub fn search_pop(&mut self) {
        self.search.pop();
        self.on_search_changed();
    }

    pub fn search_clear(&mut self) {
        self.search.clear();
        self.search_active = false;
        self.on_search_changed();
    }

    fn on_search_changed(&mut self) {
        self.data_page = 0;
        self.growth_scroll = 0;
        self.roster_scroll = 0;
    }

    /// On Enter: the trends and checker screens resolve the query to one
    /// player; the table screens just leave the filter applied.
    pub fn submit_search(&mut self) {
        self.search_active = false;
        match self.tab {
            Tab::Trends => self.resolve_trend_player(),
            Tab::Quota if self.quota_view == QuotaView::Checker => self.resolve_quota_player(),
            _ => {}
        }
    }

    fn resolve_trend_player(&mut self) {
        match self.dataset.find_player(&self.search) {
            Some(row) => {
                let player = SelectedPlayer {
                    id: row.id.clone(),
                    name: row.name.clone(),
                };
                self.push_log(format!("[INFO] Trends: showing {}", player.name));
                self.trend_player = Some(player);
                self.refresh_trend();
            }
            None => {
                self.trend_player = None;
                self.trend_series.clear();
                self.push_log("[WARN] Trends: no player matched the search");
            }
        }
    }

    fn resolve_quota_player(&mut self) {
        let Some(row) = self.dataset.find_player(&self.search) else {
            self.quota_player = None;
            self.quota_progress = None;
            self.quota_series.clear();
            self.push_log("[WARN] Quota: no player matched the search");
            return;
        };
        let id = row.id.clone();
        let name = row.name.clone();
        let history = self.dataset.player_history(&id);
        let progress = quota::compute_quota_progress(
            &history,
            self.config.campaign_start,
            self.config.death_mode,
        );
        self.quota_series = progress_series(&history, self.config.campaign_start);
        if let Some(progress) = &progress {
            if progress.used_fallback_start {
                self.push_log(format!(
                    "[WARN] Quota: no snapshot on {}, baseline is {}",
                    self.config.campaign_start, progress.start.date
                ));
            }
        }
        self.quota_player = Some(SelectedPlayer { id, name });
        self.quota_progress = progress;
    }
}

fn shift_index(idx: usize, forward: bool, last: usize) -> usize {
    if forward {
        (idx + 1).min(last)
    } else {
        idx.saturating_sub(1)
    }
}

fn sort_data_rows(rows: &mut [&PlayerSnapshot], column: DataColumn, desc: bool) {
    match column {
        DataColumn::Id => rows.sort_by(|a, b| {
            // Numeric ids compare as numbers, mixed ids fall back to text.
            match (a.id.parse::<u64>(), b.id.parse::<u64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.id.cmp(&b.id),
            }
        }),
        DataColumn::Name => rows.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        DataColumn::Alliance => {
            rows.sort_by(|a, b| a.alliance.to_lowercase().cmp(&b.alliance.to_lowercase()))
        }
        DataColumn::Power => rows.sort_by(|a, b| a.power.cmp(&b.power)),
        DataColumn::T4Kills => rows.sort_by(|a, b| a.t4_kills.cmp(&b.t4_kills)),
        DataColumn::T5Kills => rows.sort_by(|a, b| a.t5_kills.cmp(&b.t5_kills)),
        DataColumn::TotalKillPoints => {
            rows.sort_by(|a, b| a.total_kill_points.cmp(&b.total_kill_points))
        }
        DataColumn::DeadTroops => rows.sort_by(|a, b| a.dead_troops.cmp(&b.dead_troops)),
        DataColumn::TroopsPower => rows.sort_by(|a, b| a.troops_power.cmp(&b.troops_power)),
    }
    if desc {
        rows.reverse();
    }
}
