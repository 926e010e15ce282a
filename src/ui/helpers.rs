use ratatui::style::{Color, Modifier, Style};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::canvas::Canvas;

pub const ELLIPSIS: char = '…';
pub const UP_ARROW: char = '▲';
pub const DOWN_ARROW: char = '▼';
pub const SELECTED_MARKER: char = '*';

pub const STYLE_KEY: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
pub const STYLE_HINT: Style = Style::new().fg(Color::Gray);
pub const STYLE_ERROR: Style = Style::new().fg(Color::Red).add_modifier(Modifier::BOLD);
pub const STYLE_MUTED: Style = Style::new().fg(Color::DarkGray);

pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Longest prefix of `s` that fits in `max_width` columns.
pub fn take_width(s: &str, max_width: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in s.char_indices() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            return &s[..idx];
        }
        used += w;
    }
    s
}

/// Shorten a name that is wider than `half` columns to its first `half - 3`
/// columns plus an ellipsis.
pub fn truncate_name(name: &str, half: usize) -> String {
    if display_width(name) <= half {
        return name.to_string();
    }
    let mut out = take_width(name, half.saturating_sub(3)).to_string();
    out.push(ELLIPSIS);
    out
}

/// Draw one line of text between `x` and `max_x` (exclusive). Text that does
/// not fit is cut and the last visible cell becomes an ellipsis.
pub fn draw_line(canvas: &mut Canvas, x: i32, y: i32, text: &str, style: Style, max_x: i32) {
    let available = max_x - x;
    if available <= 0 {
        return;
    }
    let text = text.trim_end();
    if display_width(text) as i32 <= available {
        canvas.set_str(x, y, text, style, max_x);
        return;
    }
    let end = canvas.set_str(x, y, text, style, max_x - 1);
    // pad a gap left by a wide glyph that did not fit
    canvas.fill_rect(end, y, max_x - 1 - end, 1, ' ', style);
    canvas.set_cell(max_x - 1, y, ELLIPSIS, style);
}

/// Scroll indicators in the top-right and bottom-right cells of `inner`.
pub fn draw_scroll_arrows(
    canvas: &mut Canvas,
    inner: ratatui::layout::Rect,
    more_above: bool,
    more_below: bool,
    style: Style,
) {
    if inner.width == 0 || inner.height == 0 {
        return;
    }
    let x = inner.right() as i32 - 1;
    if more_above {
        canvas.set_cell(x, inner.y as i32, UP_ARROW, style);
    }
    if more_below {
        canvas.set_cell(x, inner.bottom() as i32 - 1, DOWN_ARROW, style);
    }
}
