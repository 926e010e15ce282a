use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::app::config::Keybinds;
use crate::ui::helpers::{STYLE_ERROR, STYLE_HINT, STYLE_KEY, STYLE_MUTED};

pub struct StatusBarWidget<'a> {
    error: Option<&'a str>,
    last_update: Option<&'a str>,
    row_count: usize,
    keybinds: &'a Keybinds,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(keybinds: &'a Keybinds) -> Self {
        Self {
            error: None,
            last_update: None,
            row_count: 0,
            keybinds,
        }
    }

    pub fn error(mut self, error: Option<&'a str>) -> Self {
        self.error = error;
        self
    }

    pub fn last_update(mut self, last_update: Option<&'a str>, row_count: usize) -> Self {
        self.last_update = last_update;
        self.row_count = row_count;
        self
    }

    fn line(&self) -> Line<'static> {
        if let Some(err) = self.error {
            return Line::from(Span::styled(format!("poll failed: {}", err), STYLE_ERROR));
        }

        let shortcuts = [
            (&self.keybinds.down, "down"),
            (&self.keybinds.up, "up"),
            (&self.keybinds.page_down, "page"),
            (&self.keybinds.focus_next, "focus"),
            (&self.keybinds.quit, "quit"),
        ];

        let mut spans: Vec<Span<'static>> = Vec::new();
        for (i, (binds, action)) in shortcuts.iter().enumerate() {
            let Some(bind) = binds.first() else {
                continue;
            };
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            spans.push(Span::styled(format!("[{}]", bind.display_short()), STYLE_KEY));
            spans.push(Span::styled(action.to_string(), STYLE_HINT));
        }

        let status = match self.last_update {
            Some(at) => format!("  updated {} ({} rows)", at, self.row_count),
            None => "  waiting for data".to_string(),
        };
        spans.push(Span::styled(status, STYLE_MUTED));
        Line::from(spans)
    }

    pub fn render(self, area: Rect, buf: &mut Buffer) {
        let area = area.intersection(buf.area);
        if area.area() == 0 {
            return;
        }
        Paragraph::new(self.line()).render(area, buf);
    }
}
