use ratatui::{buffer::Buffer, layout::Rect, style::Style};
use unicode_width::UnicodeWidthChar;

/// Clipped drawing surface over a ratatui [`Buffer`].
///
/// Coordinates are signed so widgets can compute positions left of or above
/// their area without guarding every subtraction. Anything that lands outside
/// the clip rectangle is dropped.
pub struct Canvas<'a> {
    buf: &'a mut Buffer,
    clip: Rect,
}

impl<'a> Canvas<'a> {
    pub fn new(buf: &'a mut Buffer) -> Self {
        let clip = buf.area;
        Self { buf, clip }
    }

    pub fn clip(&self) -> Rect {
        self.clip
    }

    /// Restrict drawing to `rect` (intersected with the current clip).
    pub fn clipped(&mut self, rect: Rect) -> Canvas<'_> {
        let clip = self.clip.intersection(rect);
        Canvas {
            buf: &mut *self.buf,
            clip,
        }
    }

    /// Access the underlying buffer, for rendering stock ratatui widgets.
    pub fn buffer_mut(&mut self) -> &mut Buffer {
        &mut *self.buf
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        let clip = self.clip;
        x >= clip.x as i32
            && y >= clip.y as i32
            && x < clip.x as i32 + clip.width as i32
            && y < clip.y as i32 + clip.height as i32
    }

    /// Write one glyph and return how many columns it advances.
    pub fn set_cell(&mut self, x: i32, y: i32, glyph: char, style: Style) -> i32 {
        let width = glyph.width().unwrap_or(0) as i32;
        if width == 0 {
            return 0;
        }
        // a wide glyph is only drawn when every column it covers is visible
        if !self.contains(x, y) || !self.contains(x + width - 1, y) {
            return width;
        }

        let mut tmp = [0u8; 4];
        if let Some(cell) = self.buf.cell_mut((x as u16, y as u16)) {
            cell.set_symbol(glyph.encode_utf8(&mut tmp)).set_style(style);
        }
        for dx in 1..width {
            if let Some(cell) = self.buf.cell_mut(((x + dx) as u16, y as u16)) {
                cell.reset();
            }
        }
        width
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32, glyph: char, style: Style) {
        if width <= 0 || height <= 0 {
            return;
        }
        let step = (glyph.width().unwrap_or(0) as i32).max(1);
        for row in y..y + height {
            let mut col = x;
            while col < x + width {
                self.set_cell(col, row, glyph, style);
                col += step;
            }
        }
    }

    /// Write `text` starting at `x`, never past `max_x` (exclusive).
    /// Returns the column after the last glyph written.
    pub fn set_str(&mut self, x: i32, y: i32, text: &str, style: Style, max_x: i32) -> i32 {
        let mut col = x;
        for ch in text.chars() {
            let width = ch.width().unwrap_or(0) as i32;
            if col + width > max_x {
                break;
            }
            col += self.set_cell(col, y, ch, style);
        }
        col
    }
}
