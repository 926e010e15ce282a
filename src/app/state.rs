use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
};

use super::action::Action;
use super::config::Config;
use crate::metrics::{MetricRow, MetricSnapshot};
use crate::ui::canvas::Canvas;
use crate::ui::components::{
    GaugeItem, GaugeList, ResourceList, Scrollable, SeriesPlot, StatusBarWidget, TextList,
};
use crate::ui::grid::{col, leaf, row, rows, GridNode};
use crate::ui::theme::Theme;

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetId {
    CpuGauges,
    MemGauges,
    Resources,
    Plot,
    Log,
}

/// Which widget group receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// Both gauge lists and the resource list, scrolled together.
    #[default]
    Metrics,
    Log,
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Debug,
}

impl LogEntry {
    fn to_line(&self) -> (String, Style) {
        let (level_str, level_color) = match self.level {
            LogLevel::Info => ("INFO", Color::Green),
            LogLevel::Warn => ("WARN", Color::Yellow),
            LogLevel::Error => ("ERR ", Color::Red),
            LogLevel::Debug => ("DBG ", Color::DarkGray),
        };
        (
            format!(
                "{} [{}] {}",
                self.timestamp.format("%H:%M:%S"),
                level_str,
                self.message
            ),
            Style::default().fg(level_color),
        )
    }
}

/// Run a scroll action against one widget. Returns false for anything else.
fn scroll(widget: &mut dyn Scrollable, action: &Action) -> bool {
    match action {
        Action::ScrollUp => widget.scroll_up(),
        Action::ScrollDown => widget.scroll_down(),
        Action::PageUp => widget.page_up(),
        Action::PageDown => widget.page_down(),
        Action::HalfPageUp => widget.half_page_up(),
        Action::HalfPageDown => widget.half_page_down(),
        Action::ScrollTop => widget.scroll_top(),
        Action::ScrollBottom => widget.scroll_bottom(),
        _ => return false,
    }
    true
}

/// All state owned by the UI loop: widgets, layout and the in-app log.
pub struct Dashboard {
    pub config: Config,
    cpu_gauges: GaugeList,
    mem_gauges: GaugeList,
    resources: ResourceList,
    plot: SeriesPlot,
    log_list: TextList,
    pub logs: Vec<LogEntry>,
    pub focus: Focus,
    pub running: bool,
    pub poll_in_flight: bool,
    grid: GridNode<WidgetId>,
    area: Rect,
    layout: Vec<(WidgetId, Rect)>,
    status_area: Rect,
    last_update: Option<DateTime<Local>>,
    pub last_error: Option<String>,
}

impl Dashboard {
    pub fn new(config: Config) -> Self {
        let theme = Theme::from_config(&config.theme);
        let grid = Self::grid(&config);
        Self {
            cpu_gauges: GaugeList::new("CPU", theme.clone()),
            mem_gauges: GaugeList::new("Memory", theme.clone()),
            resources: ResourceList::new("Processes", theme.clone()),
            plot: SeriesPlot::new("CPU history", theme.clone(), config.ui.history_size),
            log_list: TextList::new("Log", theme),
            logs: Vec::new(),
            focus: Focus::default(),
            running: true,
            poll_in_flight: false,
            grid,
            area: Rect::default(),
            layout: Vec::new(),
            status_area: Rect::default(),
            last_update: None,
            last_error: None,
            config,
        }
    }

    /// Gauges on top, table plus optional plot and log underneath.
    pub fn grid(config: &Config) -> GridNode<WidgetId> {
        let mut bottom = vec![col(5.0, leaf(WidgetId::Resources))];
        if config.ui.show_plot {
            bottom.push(col(3.0, leaf(WidgetId::Plot)));
        }
        if config.ui.show_log {
            bottom.push(col(2.0, leaf(WidgetId::Log)));
        }
        rows(vec![
            row(
                3.0,
                vec![
                    col(1.0, leaf(WidgetId::CpuGauges)),
                    col(1.0, leaf(WidgetId::MemGauges)),
                ],
            ),
            row(2.0, bottom),
        ])
    }

    pub fn cpu_gauges(&self) -> &GaugeList {
        &self.cpu_gauges
    }

    pub fn mem_gauges(&self) -> &GaugeList {
        &self.mem_gauges
    }

    pub fn resources(&self) -> &ResourceList {
        &self.resources
    }

    pub fn plot(&self) -> &SeriesPlot {
        &self.plot
    }

    pub fn log_list(&self) -> &TextList {
        &self.log_list
    }

    pub fn layout(&self) -> &[(WidgetId, Rect)] {
        &self.layout
    }

    pub fn status_area(&self) -> Rect {
        self.status_area
    }

    pub fn resize(&mut self, area: Rect) {
        self.area = area;
        let status_height = area.height.min(1);
        let body = Rect::new(area.x, area.y, area.width, area.height - status_height);
        self.status_area = Rect::new(area.x, body.bottom(), area.width, status_height);
        self.layout = self.grid.layout(body);
        tracing::debug!(
            "layout recomputed for {}x{}: {:?}",
            area.width,
            area.height,
            self.layout
        );
    }

    /// Claim the poll slot. Returns false while a poll is still running.
    pub fn begin_poll(&mut self) -> bool {
        if self.poll_in_flight {
            tracing::debug!("previous poll still running, skipping tick");
            return false;
        }
        self.poll_in_flight = true;
        true
    }

    pub fn apply_snapshot(&mut self, snapshot: MetricSnapshot) {
        self.poll_in_flight = false;
        let previous = self.resources.rows().len();
        let rows = snapshot.rows;

        self.cpu_gauges.set_items(gauge_items(&rows, |r| r.cpu_percent));
        self.mem_gauges.set_items(gauge_items(&rows, |r| r.mem_percent));
        self.plot
            .record(rows.iter().map(|r| (r.name.as_str(), r.cpu_percent)));

        if self.last_update.is_none() {
            self.log_info(format!("first snapshot: {} rows", rows.len()));
        } else if rows.len() != previous {
            self.log_debug(format!("row count {} -> {}", previous, rows.len()));
        }
        if self.last_error.take().is_some() {
            self.log_info("source recovered");
        }
        self.last_update = Some(Local::now());
        self.resources.set_rows(rows);
    }

    /// Keep the stale data, surface the error and carry on.
    pub fn handle_poll_failure(&mut self, error: String) {
        self.poll_in_flight = false;
        self.log_error(format!("poll failed: {}", error));
        self.last_error = Some(error);
    }

    /// Apply one action. Returns whether the screen needs a redraw.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Tick => false,
            Action::Resize { width, height } => {
                self.resize(Rect::new(0, 0, width, height));
                true
            }
            Action::SnapshotReady(snapshot) => {
                self.apply_snapshot(snapshot);
                true
            }
            Action::PollFailed(error) => {
                self.handle_poll_failure(error);
                true
            }
            Action::FocusNext => {
                self.focus = match self.focus {
                    Focus::Metrics if self.config.ui.show_log => Focus::Log,
                    _ => Focus::Metrics,
                };
                true
            }
            Action::Quit => {
                self.running = false;
                false
            }
            other if other.is_navigation() => self.navigate(&other),
            _ => false,
        }
    }

    fn navigate(&mut self, action: &Action) -> bool {
        match self.focus {
            Focus::Log => scroll(&mut self.log_list, action),
            Focus::Metrics => {
                // the table leads, the gauges follow its selection
                if !scroll(&mut self.resources, action) {
                    return false;
                }
                if let Some(selected) = self.resources.selected() {
                    self.cpu_gauges.viewport_mut().select(selected);
                    self.mem_gauges.viewport_mut().select(selected);
                }
                true
            }
        }
    }

    pub fn draw(&mut self, buf: &mut Buffer) {
        if buf.area != self.area {
            self.resize(buf.area);
        }
        let focus = self.focus;
        let layout = self.layout.clone();
        let mut canvas = Canvas::new(buf);
        for (id, rect) in layout {
            let metrics_focused = focus == Focus::Metrics;
            match id {
                WidgetId::CpuGauges => self.cpu_gauges.draw(&mut canvas, rect, metrics_focused),
                WidgetId::MemGauges => self.mem_gauges.draw(&mut canvas, rect, metrics_focused),
                WidgetId::Resources => self.resources.draw(&mut canvas, rect, metrics_focused),
                WidgetId::Plot => self.plot.draw(&mut canvas, rect, false),
                WidgetId::Log => self.log_list.draw(&mut canvas, rect, focus == Focus::Log),
            }
        }

        let updated = self.last_update.map(|t| t.format("%H:%M:%S").to_string());
        StatusBarWidget::new(&self.config.keybinds)
            .error(self.last_error.as_deref())
            .last_update(updated.as_deref(), self.resources.rows().len())
            .render(self.status_area, canvas.buffer_mut());
    }

    pub fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Local::now(),
            level,
            message: message.into(),
        };
        match level {
            LogLevel::Info => tracing::info!("{}", entry.message),
            LogLevel::Warn => tracing::warn!("{}", entry.message),
            LogLevel::Error => tracing::error!("{}", entry.message),
            LogLevel::Debug => tracing::debug!("{}", entry.message),
        }
        self.logs.push(entry);
        if self.logs.len() > MAX_LOG_ENTRIES {
            self.logs.remove(0);
        }
        self.log_list
            .set_lines(self.logs.iter().map(LogEntry::to_line).collect());
    }

    pub fn log_info(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn log_warn(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn log_error(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn log_debug(&mut self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }
}

fn gauge_items(rows: &[MetricRow], percent: impl Fn(&MetricRow) -> f64) -> Vec<GaugeItem> {
    rows.iter()
        .map(|r| GaugeItem::new(r.name.clone(), percent(r)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(names: &[&str]) -> MetricSnapshot {
        MetricSnapshot::new(
            names
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    MetricRow::new(*n)
                        .with_cpu(100 * i as u64, 10.0 * i as f64)
                        .with_memory(1 << 20, 95.0)
                })
                .collect(),
        )
    }

    fn draw(dashboard: &mut Dashboard, width: u16, height: u16) -> Buffer {
        let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
        dashboard.draw(&mut buf);
        buf
    }

    fn buffer_text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_layout_covers_all_widgets() {
        let mut dashboard = Dashboard::new(Config::default());
        dashboard.resize(Rect::new(0, 0, 100, 41));
        let ids: Vec<WidgetId> = dashboard.layout().iter().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            vec![
                WidgetId::CpuGauges,
                WidgetId::MemGauges,
                WidgetId::Resources,
                WidgetId::Plot,
                WidgetId::Log
            ]
        );
        assert_eq!(dashboard.status_area(), Rect::new(0, 40, 100, 1));
        let cpu = dashboard.layout()[0].1;
        assert_eq!(cpu, Rect::new(0, 0, 50, 24));
        let resources = dashboard.layout()[2].1;
        assert_eq!(resources, Rect::new(0, 24, 50, 16));
    }

    #[test]
    fn test_hidden_panels_leave_the_grid() {
        let mut config = Config::default();
        config.ui.show_plot = false;
        config.ui.show_log = false;
        let mut dashboard = Dashboard::new(config);
        dashboard.resize(Rect::new(0, 0, 80, 25));
        assert_eq!(dashboard.layout().len(), 3);
        assert_eq!(dashboard.layout()[2].1.width, 80);

        dashboard.apply(Action::FocusNext);
        assert_eq!(dashboard.focus, Focus::Metrics);
    }

    #[test]
    fn test_snapshot_fills_widgets() {
        let mut dashboard = Dashboard::new(Config::default());
        dashboard.poll_in_flight = true;
        assert!(dashboard.apply(Action::SnapshotReady(snapshot(&["a", "b", "c"]))));
        assert!(!dashboard.poll_in_flight);
        assert_eq!(dashboard.resources().rows().len(), 3);
        assert_eq!(dashboard.cpu_gauges().items()[2].percent, Some(20.0));
        assert_eq!(dashboard.mem_gauges().items()[0].label, "a");
        assert_eq!(dashboard.plot().slot_of("c"), Some(2));

        let text = buffer_text(&draw(&mut dashboard, 120, 40));
        assert!(text.contains("Processes"));
        assert!(text.contains("updated"));
        assert!(text.contains("(3 rows)"));
    }

    #[test]
    fn test_metric_group_scrolls_together() {
        let mut dashboard = Dashboard::new(Config::default());
        dashboard.apply(Action::SnapshotReady(snapshot(&["a", "b", "c", "d", "e"])));
        draw(&mut dashboard, 120, 40);
        dashboard.apply(Action::ScrollDown);
        dashboard.apply(Action::ScrollDown);
        assert_eq!(dashboard.resources().selected(), Some(2));
        assert_eq!(dashboard.cpu_gauges().selected(), Some(2));
        assert_eq!(dashboard.mem_gauges().selected(), Some(2));

        dashboard.apply(Action::ScrollBottom);
        assert_eq!(dashboard.cpu_gauges().selected(), Some(4));
        dashboard.apply(Action::ScrollTop);
        assert_eq!(dashboard.mem_gauges().selected(), Some(0));
    }

    #[test]
    fn test_focus_moves_navigation_to_log() {
        let mut dashboard = Dashboard::new(Config::default());
        dashboard.apply(Action::SnapshotReady(snapshot(&["a", "b"])));
        for i in 0..5 {
            dashboard.log_info(format!("entry {}", i));
        }
        assert_eq!(dashboard.log_list().selected(), Some(5));

        dashboard.apply(Action::FocusNext);
        assert_eq!(dashboard.focus, Focus::Log);
        dashboard.apply(Action::ScrollUp);
        assert_eq!(dashboard.log_list().selected(), Some(4));
        assert_eq!(dashboard.resources().selected(), Some(0));

        let buf = draw(&mut dashboard, 120, 40);
        let (_, log_rect) = dashboard.layout()[4];
        assert_eq!(buf[(log_rect.x, log_rect.y)].fg, Theme::default().selected);

        dashboard.apply(Action::FocusNext);
        assert_eq!(dashboard.focus, Focus::Metrics);
    }

    #[test]
    fn test_rows_drop_to_zero_and_return() {
        let mut dashboard = Dashboard::new(Config::default());
        dashboard.apply(Action::SnapshotReady(snapshot(&["a", "b", "c", "d", "e"])));
        dashboard.apply(Action::ScrollBottom);
        draw(&mut dashboard, 120, 40);

        dashboard.apply(Action::SnapshotReady(MetricSnapshot::default()));
        draw(&mut dashboard, 120, 40);
        assert_eq!(dashboard.resources().selected(), None);
        assert_eq!(dashboard.cpu_gauges().selected(), None);

        dashboard.apply(Action::SnapshotReady(snapshot(&["a", "b", "c", "d", "e"])));
        assert_eq!(dashboard.resources().selected(), Some(0));
        assert_eq!(dashboard.cpu_gauges().selected(), Some(0));
        draw(&mut dashboard, 120, 40);
    }

    #[test]
    fn test_poll_failure_keeps_stale_data() {
        let mut dashboard = Dashboard::new(Config::default());
        dashboard.apply(Action::SnapshotReady(snapshot(&["a", "b"])));
        assert!(dashboard.begin_poll());
        assert!(!dashboard.begin_poll());

        dashboard.apply(Action::PollFailed("connection refused".to_string()));
        assert!(!dashboard.poll_in_flight);
        assert_eq!(dashboard.resources().rows().len(), 2);
        assert_eq!(dashboard.last_error.as_deref(), Some("connection refused"));
        let last = dashboard.logs.last().map(|e| (e.level, e.message.clone()));
        assert_eq!(
            last,
            Some((LogLevel::Error, "poll failed: connection refused".to_string()))
        );

        let text = buffer_text(&draw(&mut dashboard, 120, 40));
        assert!(text.contains("poll failed: connection refused"));

        dashboard.apply(Action::SnapshotReady(snapshot(&["a"])));
        assert!(dashboard.last_error.is_none());
    }

    #[test]
    fn test_log_is_capped() {
        let mut dashboard = Dashboard::new(Config::default());
        for i in 0..150 {
            dashboard.log_debug(format!("line {}", i));
        }
        assert_eq!(dashboard.logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(dashboard.logs[0].message, "line 50");
        assert_eq!(dashboard.log_list().lines().len(), MAX_LOG_ENTRIES);
    }

    #[test]
    fn test_quit_and_resize() {
        let mut dashboard = Dashboard::new(Config::default());
        assert!(dashboard.apply(Action::Resize {
            width: 60,
            height: 20
        }));
        assert_eq!(dashboard.status_area().y, 19);
        assert!(!dashboard.apply(Action::Tick));
        assert!(!dashboard.apply(Action::Quit));
        assert!(!dashboard.running);
    }

    #[test]
    fn test_draw_survives_tiny_terminals() {
        let mut dashboard = Dashboard::new(Config::default());
        dashboard.apply(Action::SnapshotReady(snapshot(&["a", "b", "c"])));
        for (w, h) in [(0, 0), (1, 1), (3, 2), (10, 4), (7, 30)] {
            draw(&mut dashboard, w, h);
        }
    }
}
