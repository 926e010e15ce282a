use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
};

use super::{draw_frame, Scrollable};
use crate::ui::canvas::Canvas;
use crate::ui::helpers::{draw_line, draw_scroll_arrows};
use crate::ui::theme::Theme;
use crate::ui::viewport::Viewport;

/// Plain scrolling list of styled lines. Used for the log panel.
///
/// While the last line is selected, new lines keep the selection at the tail.
pub struct TextList {
    title: String,
    lines: Vec<(String, Style)>,
    viewport: Viewport,
    theme: Theme,
}

impl TextList {
    pub fn new(title: impl Into<String>, theme: Theme) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
            viewport: Viewport::new(),
            theme,
        }
    }

    pub fn set_lines(&mut self, lines: Vec<(String, Style)>) {
        let follow = match self.viewport.selected() {
            Some(sel) => sel + 1 == self.viewport.row_count(),
            None => true,
        };
        self.viewport.set_row_count(lines.len());
        self.lines = lines;
        if follow {
            self.viewport.scroll_bottom();
        }
    }

    pub fn lines(&self) -> &[(String, Style)] {
        &self.lines
    }
}

impl Scrollable for TextList {
    fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    fn draw(&mut self, canvas: &mut Canvas, area: Rect, focused: bool) {
        let inner = draw_frame(canvas, area, &self.title, &self.theme, focused);
        self.viewport.recompute_window(inner.height as usize);
        if inner.area() == 0 {
            return;
        }

        let mut canvas = canvas.clipped(inner);
        let selected = self.viewport.selected();
        // leave the last column for the scroll arrows
        let max_x = inner.right() as i32 - 1;
        for (k, idx) in self.viewport.window().enumerate() {
            let (text, style) = &self.lines[idx];
            let style = if focused && selected == Some(idx) {
                style.add_modifier(Modifier::BOLD)
            } else {
                *style
            };
            draw_line(&mut canvas, inner.x as i32, inner.y as i32 + k as i32, text, style, max_x);
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
