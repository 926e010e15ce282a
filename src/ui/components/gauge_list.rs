use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
};

use super::{draw_frame, Scrollable};
use crate::metrics::sanitize_percent;
use crate::ui::canvas::Canvas;
use crate::ui::helpers::{display_width, draw_line, draw_scroll_arrows, SELECTED_MARKER};
use crate::ui::theme::Theme;
use crate::ui::viewport::Viewport;

/// Lines taken by one gauge: top border, bar, bottom border.
pub const ROW_HEIGHT: u16 = 3;

/// Usage at or above this percentage is drawn in the critical color.
pub const CRITICAL_THRESHOLD: f64 = 90.0;

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeItem {
    pub label: String,
    /// `None` for malformed readings.
    pub percent: Option<f64>,
}

impl GaugeItem {
    pub fn new(label: impl Into<String>, percent: f64) -> Self {
        Self {
            label: label.into(),
            percent: sanitize_percent(percent),
        }
    }

    fn percent_label(&self) -> String {
        match self.percent {
            Some(p) => format!("{:.0}%", p),
            None => "n/a".to_string(),
        }
    }
}

/// Filled columns of a bar `track` columns wide.
pub fn fill_width(percent: f64, track: u16) -> u16 {
    if !percent.is_finite() || percent <= 0.0 {
        return 0;
    }
    let filled = (percent / 100.0 * track as f64).round();
    filled.min(track as f64) as u16
}

pub fn gauge_color(percent: f64, theme: &Theme) -> Color {
    if percent >= CRITICAL_THRESHOLD {
        theme.critical
    } else {
        theme.nominal
    }
}

/// A scrollable stack of labelled percentage bars.
pub struct GaugeList {
    title: String,
    items: Vec<GaugeItem>,
    viewport: Viewport,
    theme: Theme,
}

impl GaugeList {
    pub fn new(title: impl Into<String>, theme: Theme) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
            viewport: Viewport::new(),
            theme,
        }
    }

    pub fn set_items(&mut self, items: Vec<GaugeItem>) {
        self.viewport.set_row_count(items.len());
        self.items = items;
    }

    pub fn items(&self) -> &[GaugeItem] {
        &self.items
    }

    fn draw_gauge(&self, canvas: &mut Canvas, inner: Rect, y: i32, item: &GaugeItem, selected: bool) {
        let frame_left = inner.x as i32 + 1;
        let frame_right = inner.right() as i32 - 1;
        if frame_right <= frame_left {
            return;
        }
        let border = self.theme.border_style(false);

        canvas.fill_rect(frame_left + 1, y, frame_right - frame_left - 1, 1, '─', border);
        canvas.fill_rect(frame_left + 1, y + 2, frame_right - frame_left - 1, 1, '─', border);
        canvas.set_cell(frame_left, y, '┌', border);
        canvas.set_cell(frame_right, y, '┐', border);
        canvas.set_cell(frame_left, y + 1, '│', border);
        canvas.set_cell(frame_right, y + 1, '│', border);
        canvas.set_cell(frame_left, y + 2, '└', border);
        canvas.set_cell(frame_right, y + 2, '┘', border);
        draw_line(
            canvas,
            frame_left + 1,
            y,
            &format!(" {} ", item.label),
            self.theme.text_style(),
            frame_right,
        );

        let track_x = frame_left + 1;
        let track_width = (frame_right - frame_left - 1).max(0) as u16;
        let percent = item.percent.unwrap_or(0.0);
        let color = gauge_color(percent, &self.theme);
        let filled = fill_width(percent, track_width) as i32;
        canvas.fill_rect(track_x, y + 1, filled, 1, ' ', Style::default().bg(color));

        // centered label, reversed where it sits on the filled part
        let label = item.percent_label();
        let label_width = display_width(&label) as i32;
        let label_x = track_x + ((track_width as i32 - label_width) / 2).max(0);
        let track_end = track_x + track_width as i32;
        for (i, ch) in label.chars().enumerate() {
            let x = label_x + i as i32;
            if x >= track_end {
                break;
            }
            let style = if x < track_x + filled {
                Style::default().fg(color).add_modifier(Modifier::REVERSED)
            } else {
                self.theme.text_style()
            };
            canvas.set_cell(x, y + 1, ch, style);
        }

        if selected {
            canvas.set_cell(inner.x as i32, y + 1, SELECTED_MARKER, self.theme.marker_style());
        }
    }
}

impl Scrollable for GaugeList {
    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn draw(&mut self, canvas: &mut Canvas, area: Rect, focused: bool) {
        let inner = draw_frame(canvas, area, &self.title, &self.theme, focused);
        self.viewport
            .recompute_window((inner.height / ROW_HEIGHT) as usize);
        if inner.area() == 0 {
            return;
        }

        let mut canvas = canvas.clipped(inner);
        let selected = self.viewport.selected();
        for (k, idx) in self.viewport.window().enumerate() {
            let y = inner.y as i32 + k as i32 * ROW_HEIGHT as i32;
            self.draw_gauge(&mut canvas, inner, y, &self.items[idx], selected == Some(idx));
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
