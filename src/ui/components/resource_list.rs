use ratatui::{layout::Rect, style::Modifier};

use super::{draw_frame, Scrollable};
use crate::metrics::{sanitize_percent, MetricRow};
use crate::ui::canvas::Canvas;
use crate::ui::helpers::{display_width, draw_line, draw_scroll_arrows, truncate_name, SELECTED_MARKER};
use crate::ui::theme::Theme;
use crate::ui::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Namespace,
    Name,
    Status,
    Ready,
    Restarts,
    CpuCores,
    CpuPercent,
    Memory,
    MemPercent,
    Age,
    Node,
}

impl Column {
    const ALL: [Column; 11] = [
        Column::Namespace,
        Column::Name,
        Column::Status,
        Column::Ready,
        Column::Restarts,
        Column::CpuCores,
        Column::CpuPercent,
        Column::Memory,
        Column::MemPercent,
        Column::Age,
        Column::Node,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Namespace => "NAMESPACE",
            Column::Name => "NAME",
            Column::Status => "STATUS",
            Column::Ready => "READY",
            Column::Restarts => "RESTARTS",
            Column::CpuCores => "CPU(cores)",
            Column::CpuPercent => "CPU%",
            Column::Memory => "MEMORY(bytes)",
            Column::MemPercent => "MEMORY%",
            Column::Age => "AGE",
            Column::Node => "NODE",
        }
    }

    /// Optional columns only show up when some row carries the field.
    fn present(self, rows: &[MetricRow]) -> bool {
        match self {
            Column::Namespace => rows.iter().any(|r| r.namespace.is_some()),
            Column::Status => rows.iter().any(|r| r.status.is_some()),
            Column::Ready => rows.iter().any(|r| r.ready.is_some() && r.total.is_some()),
            Column::Restarts => rows.iter().any(|r| r.restarts.is_some()),
            Column::Age => rows.iter().any(|r| r.age.is_some()),
            Column::Node => rows.iter().any(|r| r.node.is_some()),
            Column::Name
            | Column::CpuCores
            | Column::CpuPercent
            | Column::Memory
            | Column::MemPercent => true,
        }
    }

    fn cell(self, row: &MetricRow, name_half: usize) -> String {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        match self {
            Column::Namespace => opt(&row.namespace),
            Column::Name => truncate_name(&row.name, name_half),
            Column::Status => opt(&row.status),
            Column::Ready => match (row.ready, row.total) {
                (Some(ready), Some(total)) => format!("{}/{}", ready, total),
                _ => String::new(),
            },
            Column::Restarts => row.restarts.map(|r| r.to_string()).unwrap_or_default(),
            Column::CpuCores => format!("{}m", row.cpu_millicores),
            Column::CpuPercent => format_percent(row.cpu_percent),
            Column::Memory => format!("{}Mi", row.mem_mebibytes()),
            Column::MemPercent => format_percent(row.mem_percent),
            Column::Age => opt(&row.age),
            Column::Node => opt(&row.node),
        }
    }
}

fn pad_fields<'a>(fields: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::new();
    for (field, width) in fields.zip(widths) {
        line.push_str(field);
        let pad = width.saturating_sub(display_width(field));
        line.extend(std::iter::repeat(' ').take(pad));
    }
    line
}

pub fn columns_for(rows: &[MetricRow]) -> Vec<Column> {
    Column::ALL.into_iter().filter(|c| c.present(rows)).collect()
}

fn format_percent(percent: f64) -> String {
    format!("{:.2}", sanitize_percent(percent).unwrap_or(0.0))
}

/// Align `cells` under `headers` on tab stops.
///
/// Each column is as wide as its widest entry plus one space. Returns the
/// column widths and the rendered lines, header first.
pub fn tabulate(headers: &[&str], cells: &[Vec<String>]) -> (Vec<usize>, Vec<String>) {
    let mut widths: Vec<usize> = headers.iter().map(|h| display_width(h)).collect();
    for row in cells {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(display_width(cell));
        }
    }
    for w in widths.iter_mut() {
        *w += 1;
    }

    let mut lines = Vec::with_capacity(cells.len() + 1);
    lines.push(pad_fields(headers.iter().copied(), &widths));
    for row in cells {
        lines.push(pad_fields(row.iter().map(String::as_str), &widths));
    }
    (widths, lines)
}

/// Header plus one line per monitored entity.
pub struct ResourceList {
    title: String,
    rows: Vec<MetricRow>,
    viewport: Viewport,
    theme: Theme,
}

impl ResourceList {
    pub fn new(title: impl Into<String>, theme: Theme) -> Self {
        Self {
            title: title.into(),
            rows: Vec::new(),
            viewport: Viewport::new(),
            theme,
        }
    }

    pub fn set_rows(&mut self, rows: Vec<MetricRow>) {
        self.viewport.set_row_count(rows.len());
        self.rows = rows;
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }
}

impl Scrollable for ResourceList {
    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn draw(&mut self, canvas: &mut Canvas, area: Rect, focused: bool) {
        let inner = draw_frame(canvas, area, &self.title, &self.theme, focused);
        self.viewport
            .recompute_window(inner.height.saturating_sub(1) as usize);
        if inner.area() == 0 {
            return;
        }

        let half = (inner.width / 2) as usize;
        let columns = columns_for(&self.rows);
        let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| columns.iter().map(|c| c.cell(row, half)).collect())
            .collect();
        let (_, lines) = tabulate(&headers, &cells);

        let mut canvas = canvas.clipped(inner);
        let content_x = inner.x as i32 + 2;
        let max_x = inner.right() as i32;
        draw_line(
            &mut canvas,
            content_x,
            inner.y as i32,
            &lines[0],
            self.theme.text_style().add_modifier(Modifier::BOLD),
            max_x,
        );

        let selected = self.viewport.selected();
        for (k, idx) in self.viewport.window().enumerate() {
            let y = inner.y as i32 + 1 + k as i32;
            let style = if selected == Some(idx) {
                canvas.set_cell(inner.x as i32, y, SELECTED_MARKER, self.theme.marker_style());
                self.theme.selected_row_style()
            } else {
                self.theme.text_style()
            };
            draw_line(&mut canvas, content_x, y, &lines[idx + 1], style, max_x);
        }

        draw_scroll_arrows(
            &mut canvas,
            inner,
            self.viewport.more_above(),
            self.viewport.more_below(),
            self.theme.text_style(),
        );
    }
}
