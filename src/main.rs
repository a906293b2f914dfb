use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::{Axis, Block, Borders, Chart, Clear, Dataset as ChartDataset, Gauge,
    GraphType, Paragraph};

use rok_terminal::config::Config;
use rok_terminal::dataset::{Dataset, PeriodPreset};
use rok_terminal::format::{format_compact, format_count, format_signed_compact, status_label};
use rok_terminal::quota::QuotaProgress;
use rok_terminal::state::{AppState, DataColumn, QuotaView, SelectedPlayer, Tab, ALL_TABS};
use rok_terminal::top_stats::TopNStat;

struct App {
    state: AppState,
    should_quit: bool,
}

impl App {
    fn new(state: AppState) -> Self {
        Self {
            state,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.search_active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => {
                if self.state.help_overlay {
                    self.state.help_overlay = false;
                } else {
                    self.state.search_clear();
                }
            }
            KeyCode::Char('/') => self.state.toggle_search(),
            KeyCode::Tab => self.state.next_tab(),
            KeyCode::Char('1') => self.state.set_tab(Tab::Data),
            KeyCode::Char('2') => self.state.set_tab(Tab::Growth),
            KeyCode::Char('3') => self.state.set_tab(Tab::Trends),
            KeyCode::Char('4') => self.state.set_tab(Tab::TopStats),
            KeyCode::Char('5') => self.state.set_tab(Tab::Quota),
            _ => match self.state.tab {
                Tab::Data => self.on_data_key(key),
                Tab::Growth => self.on_growth_key(key),
                Tab::Trends => self.on_trends_key(key),
                Tab::TopStats => self.on_top_key(key),
                Tab::Quota => self.on_quota_key(key),
            },
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.state.submit_search(),
            KeyCode::Esc => self.state.search_clear(),
            KeyCode::Backspace => self.state.search_pop(),
            KeyCode::Char(ch) => self.state.search_push(ch),
            _ => {}
        }
    }

    fn on_data_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('[') | KeyCode::Left => self.state.data_prev_date(),
            KeyCode::Char(']') | KeyCode::Right => self.state.data_next_date(),
            KeyCode::Char('n') | KeyCode::Down | KeyCode::Char('j') => self.state.data_next_page(),
            KeyCode::Char('p') | KeyCode::Up | KeyCode::Char('k') => self.state.data_prev_page(),
            KeyCode::Char('s') => self.state.data_cycle_sort(),
            KeyCode::Char('o') => self.state.data_toggle_order(),
            _ => {}
        }
    }

    fn on_growth_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.growth_scroll += 1,
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.growth_scroll = self.state.growth_scroll.saturating_sub(1)
            }
            KeyCode::Char('h') => self.state.growth_shift_start(false),
            KeyCode::Char('l') => self.state.growth_shift_start(true),
            KeyCode::Char('H') => self.state.growth_shift_end(false),
            KeyCode::Char('L') => self.state.growth_shift_end(true),
            KeyCode::Char('m') => self.state.growth_cycle_metric(),
            KeyCode::Char('s') => self.state.growth_cycle_sort(),
            KeyCode::Char('f') => self.state.growth_cycle_filter(),
            KeyCode::Char('c') => self.state.growth_cycle_limit(),
            KeyCode::Char('z') => self.state.growth_apply_preset(PeriodPreset::Latest),
            KeyCode::Char('w') => self.state.growth_apply_preset(PeriodPreset::Week),
            KeyCode::Char('t') => self.state.growth_apply_preset(PeriodPreset::Month),
            KeyCode::Char('a') => self.state.growth_apply_preset(PeriodPreset::All),
            _ => {}
        }
    }

    fn on_trends_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('m') {
            self.state.trend_cycle_metric();
        }
    }

    fn on_top_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('m') => self.state.top_cycle_metric(),
            KeyCode::Char('j') | KeyCode::Down => self.state.top_scroll += 1,
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.top_scroll = self.state.top_scroll.saturating_sub(1)
            }
            _ => {}
        }
    }

    fn on_quota_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('v') => self.state.toggle_quota_view(),
            KeyCode::Char('f') => self.state.roster_cycle_filter(),
            KeyCode::Char('s') => self.state.roster_cycle_sort(),
            KeyCode::Char('j') | KeyCode::Down => self.state.roster_scroll += 1,
            KeyCode::Char('k') | KeyCode::Up => {
                self.state.roster_scroll = self.state.roster_scroll.saturating_sub(1)
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    let dataset =
        Dataset::from_csv_path(&config.csv_path).context("load player snapshot data")?;
    let mut app = App::new(AppState::new(dataset, config));
    app.state.push_log(format!(
        "[INFO] Loaded {} snapshots across {} dates",
        app.state.dataset.len(),
        app.state.dates().len()
    ));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header =
        Paragraph::new(header_text(&app.state)).block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.tab {
        Tab::Data => render_data(frame, chunks[1], &app.state),
        Tab::Growth => render_growth(frame, chunks[1], &app.state),
        Tab::Trends => render_trends(frame, chunks[1], &app.state),
        Tab::TopStats => render_top_stats(frame, chunks[1], &app.state),
        Tab::Quota => render_quota(frame, chunks[1], &app.state),
    }

    let footer =
        Paragraph::new(footer_text(&app.state)).block(Block::default());
    frame.render_widget(footer, chunks[2]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let tabs: Vec<String> = ALL_TABS
        .iter()
        .enumerate()
        .map(|(idx, tab)| {
            let marker = if *tab == state.tab { "*" } else { " " };
            format!("{marker}{} {}", idx + 1, tab.label())
        })
        .collect();
    let range = match (state.dataset.earliest_date(), state.dataset.latest_date()) {
        (Some(first), Some(last)) => format!("{first} .. {last}"),
        _ => "no data".to_string(),
    };
    let line1 = format!(
        "ROK TERMINAL | {} players | {} rows | {range}",
        state.dataset.player_count(),
        state.dataset.len()
    );
    let line2 = if state.search_active {
        format!("Search: {}_", state.search)
    } else if !state.search.is_empty() {
        format!("{} | Filter: {}", tabs.join(" "), state.search)
    } else {
        tabs.join(" ")
    };
    format!("{line1}\n{line2}")
}

fn footer_text(state: &AppState) -> String {
    if state.search_active {
        return "Type to search | Enter Apply | Esc Cancel".to_string();
    }
    match state.tab {
        Tab::Data => "[/] Date | j/k Page | s Sort | o Order | / Search | ? Help | q Quit"
            .to_string(),
        Tab::Growth => {
            "h/l Start | H/L End | z/w/t/a Preset | m Metric | s Sort | f Filter | c Limit | ? Help | q Quit"
                .to_string()
        }
        Tab::Trends => "/ Player | m Metric | ? Help | q Quit".to_string(),
        Tab::TopStats => "m Metric | j/k Scroll | ? Help | q Quit".to_string(),
        Tab::Quota => {
            "v Checker/Roster | / Player | f Filter | s Sort | j/k Scroll | ? Help | q Quit"
                .to_string()
        }
    }
}

// ----- data tab -----

const DATA_COLUMNS: [DataColumn; 9] = [
    DataColumn::Id,
    DataColumn::Name,
    DataColumn::Alliance,
    DataColumn::Power,
    DataColumn::T4Kills,
    DataColumn::T5Kills,
    DataColumn::TotalKillPoints,
    DataColumn::DeadTroops,
    DataColumn::TroopsPower,
];

fn data_columns() -> [Constraint; 9] {
    [
        Constraint::Length(10),
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(12),
    ]
}

fn render_data(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let date_label = state
        .data_date()
        .map(|d| d.to_string())
        .unwrap_or_else(|| "no dates".to_string());
    let order = if state.data_sort_desc { "desc" } else { "asc" };
    let status = Paragraph::new(format!(
        "Date: {date_label} | Sort: {} {order} | Page {}/{}",
        state.data_sort.label(),
        state.data_page + 1,
        state.data_page_count()
    ))
    .style(Style::default().fg(Color::Cyan));
    frame.render_widget(status, sections[0]);

    let widths = data_columns();
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[1]);
    let header_style = Style::default().add_modifier(Modifier::BOLD);
    for (idx, column) in DATA_COLUMNS.iter().enumerate() {
        let marker = if *column == state.data_sort { "*" } else { "" };
        render_cell_text(
            frame,
            header_cols[idx],
            &format!("{}{marker}", column.label()),
            header_style,
        );
    }

    let rows = state.data_rows();
    if rows.is_empty() {
        let empty = Paragraph::new("No snapshots match").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, sections[2]);
        return;
    }

    let list_area = sections[2];
    let page_size = state.config.page_size;
    let start = (state.data_page * page_size).min(rows.len().saturating_sub(1));
    let end = (start + page_size).min(rows.len());
    let visible = (list_area.height as usize).min(end - start);

    for (i, row) in rows[start..start + visible].iter().enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        render_cell_text(frame, cols[0], &row.id, Style::default());
        render_cell_text(frame, cols[1], &row.name, Style::default());
        render_cell_text(frame, cols[2], &row.alliance, Style::default());
        render_cell_text(frame, cols[3], &format_count(row.power), Style::default());
        render_cell_text(frame, cols[4], &format_count(row.t4_kills), Style::default());
        render_cell_text(frame, cols[5], &format_count(row.t5_kills), Style::default());
        render_cell_text(
            frame,
            cols[6],
            &format_count(row.total_kill_points),
            Style::default(),
        );
        render_cell_text(frame, cols[7], &format_count(row.dead_troops), Style::default());
        render_cell_text(
            frame,
            cols[8],
            &format_count(row.troops_power),
            Style::default(),
        );
    }
}

// ----- growth tab -----

fn growth_columns() -> [Constraint; 8] {
    [
        Constraint::Length(5),
        Constraint::Min(16),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(10),
    ]
}

fn render_growth(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let range = match state.growth_range() {
        Some((start, end)) => format!("{start} -> {end}"),
        None => "no range".to_string(),
    };
    let status = Paragraph::new(format!(
        "{range} | Metric: {} | Sort: {} | Filter: {} | Top {}",
        state.growth_metric.label(),
        state.growth_sort.label(),
        state.growth_filter.label(),
        state.growth_limit_label()
    ))
    .style(Style::default().fg(Color::Cyan));
    frame.render_widget(status, sections[0]);

    let widths = growth_columns();
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[1]);
    let style = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, header_cols[0], "#", style);
    render_cell_text(frame, header_cols[1], "Name", style);
    render_cell_text(frame, header_cols[2], "Alliance", style);
    render_cell_text(frame, header_cols[3], "Start", style);
    render_cell_text(frame, header_cols[4], "End", style);
    render_cell_text(frame, header_cols[5], "Diff", style);
    render_cell_text(frame, header_cols[6], "Rate", style);
    render_cell_text(frame, header_cols[7], "Per Day", style);

    let rows = state.growth_rows();
    let list_area = sections[2];
    if rows.is_empty() {
        let empty =
            Paragraph::new("No growth entries for this range").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let max_start = rows.len().saturating_sub(visible);
    let start = state.growth_scroll.min(max_start);
    let end = (start + visible).min(rows.len());

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let entry = &rows[idx];
        let diff_style = if entry.difference >= 0 {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Red)
        };

        render_cell_text(frame, cols[0], &format!("{}", idx + 1), Style::default());
        render_cell_text(frame, cols[1], &entry.name, Style::default());
        render_cell_text(frame, cols[2], &entry.alliance, Style::default());
        render_cell_text(
            frame,
            cols[3],
            &format_compact(entry.start_value as i64),
            Style::default(),
        );
        render_cell_text(
            frame,
            cols[4],
            &format_compact(entry.end_value as i64),
            Style::default(),
        );
        render_cell_text(
            frame,
            cols[5],
            &format_signed_compact(entry.difference),
            diff_style,
        );
        render_cell_text(
            frame,
            cols[6],
            &format!("{:+.1}%", entry.growth_rate),
            diff_style,
        );
        render_cell_text(
            frame,
            cols[7],
            &format_signed_compact(entry.daily_average.round() as i64),
            Style::default(),
        );
    }
}

// ----- trends tab -----

fn render_trends(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(4)])
        .split(area);

    match &state.trend_player {
        Some(player) => render_trend_chart(frame, sections[0], state, player),
        None => {
            let hint = Paragraph::new("Press / and type a player name or id, then Enter")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title("Trends").borders(Borders::ALL));
            frame.render_widget(hint, sections[0]);
        }
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, sections[1]);
}

fn render_trend_chart(frame: &mut Frame, area: Rect, state: &AppState, player: &SelectedPlayer) {
    let series = &state.trend_series;
    if series.is_empty() {
        let empty = Paragraph::new("No history for this player")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Trends").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let base_date = series[0].0;
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|(date, value)| ((*date - base_date).num_days() as f64, *value as f64))
        .collect();
    let (y_min, y_max) = value_bounds(series.iter().map(|(_, v)| *v));
    let x_max = points.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);

    let title = format!("{} | {}", player.name, state.trend_metric.label());
    let datasets = vec![ChartDataset::default()
        .name(state.trend_metric.label())
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points)];

    let last_date = series[series.len() - 1].0;
    let chart = Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw(base_date.to_string()),
                    Span::raw(last_date.to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format_compact(y_min as i64)),
                    Span::raw(format_compact(y_max as i64)),
                ]),
        );
    frame.render_widget(chart, area);
}

// ----- top stats tab -----

fn render_top_stats(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_top_chart(frame, sections[0], state);
    render_top_table(frame, sections[1], state);
}

fn render_top_chart(frame: &mut Frame, area: Rect, state: &AppState) {
    let series = &state.top_series;
    if series.is_empty() {
        let empty = Paragraph::new("No data")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().title("Top total").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let base_date = series[0].0;
    let points: Vec<(f64, f64)> = series
        .iter()
        .map(|(date, stat)| ((*date - base_date).num_days() as f64, stat.total as f64))
        .collect();
    let (y_min, y_max) = value_bounds(series.iter().map(|(_, stat)| stat.total));
    let x_max = points.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);

    let title = format!(
        "Top {} by power | total {}",
        state.config.top_n,
        state.top_metric.label()
    );
    let datasets = vec![ChartDataset::default()
        .name("total")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Yellow))
        .data(&points)];

    let last_date = series[series.len() - 1].0;
    let chart = Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw(base_date.to_string()),
                    Span::raw(last_date.to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format_compact(y_min as i64)),
                    Span::raw(format_compact(y_max as i64)),
                ]),
        );
    frame.render_widget(chart, area);
}

fn top_columns() -> [Constraint; 5] {
    [
        Constraint::Length(12),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Min(10),
    ]
}

fn render_top_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Per date").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height < 2 {
        return;
    }

    let widths = top_columns();
    let header_area = Rect { height: 1, ..inner };
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(header_area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, header_cols[0], "Date", style);
    render_cell_text(frame, header_cols[1], "Total", style);
    render_cell_text(frame, header_cols[2], "Average", style);
    render_cell_text(frame, header_cols[3], "Count", style);
    render_cell_text(frame, header_cols[4], "Change", style);

    let rows = &state.top_series;
    let list_height = (inner.height - 1) as usize;
    let max_start = rows.len().saturating_sub(list_height);
    let start = state.top_scroll.min(max_start);
    let end = (start + list_height).min(rows.len());

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: inner.x,
            y: inner.y + 1 + i as u16,
            width: inner.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let (date, stat) = &rows[idx];
        let change = top_change(rows, idx, *stat);
        render_cell_text(frame, cols[0], &date.to_string(), Style::default());
        render_cell_text(frame, cols[1], &format_compact(stat.total as i64), Style::default());
        render_cell_text(
            frame,
            cols[2],
            &format_compact(stat.average.round() as i64),
            Style::default(),
        );
        render_cell_text(frame, cols[3], &stat.count.to_string(), Style::default());
        render_cell_text(frame, cols[4], &change, Style::default());
    }
}

fn top_change(rows: &[(chrono::NaiveDate, TopNStat)], idx: usize, stat: TopNStat) -> String {
    if idx == 0 {
        return "-".to_string();
    }
    let prev = rows[idx - 1].1.total as i64;
    format_signed_compact(stat.total as i64 - prev)
}

// ----- quota tab -----

fn render_quota(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.quota_view {
        QuotaView::Checker => render_quota_checker(frame, area, state),
        QuotaView::Roster => render_quota_roster(frame, area, state),
    }
}

fn render_quota_checker(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(4)])
        .split(area);

    match (&state.quota_player, &state.quota_progress) {
        (Some(player), Some(progress)) => {
            render_checker_detail(frame, sections[0], state, player, progress)
        }
        _ => {
            let hint = Paragraph::new("Press / and type a player name or id, then Enter")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title("KVK Checker").borders(Borders::ALL));
            frame.render_widget(hint, sections[0]);
        }
    }

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, sections[1]);
}

fn render_checker_detail(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    player: &SelectedPlayer,
    progress: &QuotaProgress,
) {
    let block = Block::default()
        .title(format!(
            "KVK Checker | {} | Death targets: {}",
            player.name,
            state.death_mode().label()
        ))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let band = progress
        .band
        .map(|b| b.label())
        .unwrap_or_else(|| "under 45M (no quota)".to_string());
    let baseline = if progress.used_fallback_start {
        format!("{} (earliest snapshot)", progress.start.date)
    } else {
        progress.start.date.to_string()
    };
    let summary = vec![
        format!("Band: {band} (current power {})", format_count(progress.current.power)),
        format!(
            "Baseline: {baseline} | power then {}",
            format_count(progress.start.power)
        ),
        format!("Latest: {}", progress.current.date),
        format!(
            "Overall: {:.1}% [{}]",
            progress.overall_pct,
            status_label(progress.overall_pct)
        ),
        format!(
            "Remaining: kills {} | deaths {}",
            format_compact(progress.kill_remaining as i64),
            format_compact(progress.death_remaining as i64)
        ),
    ];
    frame.render_widget(Paragraph::new(summary.join("\n")), rows[0]);

    let kill_gauge = Gauge::default()
        .block(Block::default().title(format!(
            "Kills {} / {}",
            format_compact(progress.kill_progress),
            format_compact(progress.kill_target as i64)
        )))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(progress.kill_pct.round() as u16);
    frame.render_widget(kill_gauge, rows[1]);

    let death_gauge = Gauge::default()
        .block(Block::default().title(format!(
            "Deaths {} / {}",
            format_compact(progress.death_progress),
            format_compact(progress.death_target as i64)
        )))
        .gauge_style(Style::default().fg(Color::Red))
        .percent(progress.death_pct.round() as u16);
    frame.render_widget(death_gauge, rows[2]);

    render_progress_sparkline(frame, rows[3], state);
}

fn render_progress_sparkline(frame: &mut Frame, area: Rect, state: &AppState) {
    if area.height == 0 {
        return;
    }
    let series = &state.quota_series;
    if series.len() < 2 {
        let empty = Paragraph::new("Not enough snapshots for a progress chart")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let base_date = series[0].date;
    let kills: Vec<(f64, f64)> = series
        .iter()
        .map(|p| ((p.date - base_date).num_days() as f64, p.kill_progress as f64))
        .collect();
    let deaths: Vec<(f64, f64)> = series
        .iter()
        .map(|p| ((p.date - base_date).num_days() as f64, p.death_progress as f64))
        .collect();

    let y_max = series
        .iter()
        .map(|p| p.kill_progress.max(p.death_progress))
        .max()
        .unwrap_or(0)
        .max(1) as f64;
    let y_min = series
        .iter()
        .map(|p| p.kill_progress.min(p.death_progress))
        .min()
        .unwrap_or(0)
        .min(0) as f64;
    let x_max = kills.last().map(|(x, _)| *x).unwrap_or(0.0).max(1.0);

    let last_date = series[series.len() - 1].date;
    let datasets = vec![
        ChartDataset::default()
            .name("kills")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&kills),
        ChartDataset::default()
            .name("deaths")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&deaths),
    ];
    let chart = Chart::new(datasets)
        .block(Block::default().title("Progress since start").borders(Borders::TOP))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_max])
                .labels(vec![
                    Span::raw(base_date.to_string()),
                    Span::raw(last_date.to_string()),
                ]),
        )
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format_compact(y_min as i64)),
                    Span::raw(format_compact(y_max as i64)),
                ]),
        );
    frame.render_widget(chart, area);
}

fn roster_columns() -> [Constraint; 9] {
    [
        Constraint::Min(14),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(9),
    ]
}

fn render_quota_roster(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let status = Paragraph::new(format!(
        "Roster | Start: {} | Death targets: {} | Filter: {} | Sort: {}",
        state.config.campaign_start,
        state.death_mode().label(),
        state.roster_filter.label(),
        state.roster_sort.label()
    ))
    .style(Style::default().fg(Color::Cyan));
    frame.render_widget(status, sections[0]);

    let widths = roster_columns();
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[1]);
    let style = Style::default().add_modifier(Modifier::BOLD);
    render_cell_text(frame, header_cols[0], "Name", style);
    render_cell_text(frame, header_cols[1], "Alliance", style);
    render_cell_text(frame, header_cols[2], "Band", style);
    render_cell_text(frame, header_cols[3], "Power", style);
    render_cell_text(frame, header_cols[4], "Kill%", style);
    render_cell_text(frame, header_cols[5], "Death%", style);
    render_cell_text(frame, header_cols[6], "T4+", style);
    render_cell_text(frame, header_cols[7], "T5+", style);
    render_cell_text(frame, header_cols[8], "Status", style);

    let rows = state.roster_rows();
    let list_area = sections[2];
    if rows.is_empty() {
        let empty =
            Paragraph::new("No players match").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let max_start = rows.len().saturating_sub(visible);
    let start = state.roster_scroll.min(max_start);
    let end = (start + visible).min(rows.len());

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let entry = &rows[idx];
        let status_style = if entry.both_achieved {
            Style::default().fg(Color::Green)
        } else if entry.kill_achieved || entry.death_achieved {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Red)
        };
        let status = if entry.both_achieved {
            "DONE".to_string()
        } else {
            format!("{:.0}%", entry.progress.overall_pct)
        };

        render_cell_text(frame, cols[0], &entry.name, Style::default());
        render_cell_text(frame, cols[1], &entry.alliance, Style::default());
        render_cell_text(frame, cols[2], &entry.band_label, Style::default());
        render_cell_text(frame, cols[3], &format_compact(entry.power as i64), Style::default());
        render_cell_text(
            frame,
            cols[4],
            &format!("{:.0}%", entry.progress.kill_pct),
            Style::default(),
        );
        render_cell_text(
            frame,
            cols[5],
            &format!("{:.0}%", entry.progress.death_pct),
            Style::default(),
        );
        render_cell_text(
            frame,
            cols[6],
            &format_signed_compact(entry.t4_increase),
            Style::default(),
        );
        render_cell_text(
            frame,
            cols[7],
            &format_signed_compact(entry.t5_increase),
            Style::default(),
        );
        render_cell_text(frame, cols[8], &status, status_style);
    }
}

// ----- shared helpers -----

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(2)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn value_bounds<I: Iterator<Item = u64>>(values: I) -> (f64, f64) {
    let mut min = u64::MAX;
    let mut max = 0u64;
    for value in values {
        min = min.min(value);
        max = max.max(value);
    }
    if min == u64::MAX {
        return (0.0, 1.0);
    }
    if min == max {
        // Flat series still needs a non-degenerate axis.
        return (min as f64 * 0.95, max as f64 * 1.05 + 1.0);
    }
    (min as f64, max as f64)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "ROK Terminal - Help",
        "",
        "Global:",
        "  1-5 / Tab    Switch screens",
        "  /            Search (Enter applies, Esc clears)",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Data:",
        "  [ ]          Previous / next date",
        "  j/k          Page down / up",
        "  s, o         Cycle sort column, flip order",
        "",
        "Growth:",
        "  h/l H/L      Shift start / end date",
        "  z w t a      Presets: latest, week, month, all",
        "  m s f c      Metric, sort, filter, limit",
        "",
        "Trends / Top 300:",
        "  m            Cycle metric",
        "",
        "KVK Quota:",
        "  v            Toggle checker / roster",
        "  f, s         Roster filter, sort",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
