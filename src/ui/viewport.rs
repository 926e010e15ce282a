/// Selection and visible window for a list of rows.
///
/// The window follows the selection: scrolling only moves `selected`, and the
/// next [`Viewport::recompute_window`] pulls `top` along so the selection stays
/// visible. This is also what keeps the selection on screen after a resize.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    row_count: usize,
    selected: usize,
    top: usize,
    visible: usize,
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// `None` when there are no rows.
    pub fn selected(&self) -> Option<usize> {
        if self.row_count == 0 {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn top(&self) -> usize {
        self.top
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    /// Called when the underlying rows are replaced.
    pub fn set_row_count(&mut self, row_count: usize) {
        self.row_count = row_count;
        if row_count == 0 {
            self.selected = 0;
            self.top = 0;
            return;
        }
        self.selected = self.selected.min(row_count - 1);
        self.top = self.top.min(self.max_top());
    }

    pub fn scroll_by(&mut self, amount: isize) {
        if self.row_count == 0 {
            return;
        }
        let last = self.row_count - 1;
        self.selected = if amount < 0 {
            self.selected.saturating_sub(amount.unsigned_abs())
        } else {
            self.selected.saturating_add(amount as usize).min(last)
        };
    }

    /// Move the selection to `index`, clamped to the last row.
    pub fn select(&mut self, index: usize) {
        self.selected = index.min(self.row_count.saturating_sub(1));
    }

    pub fn scroll_up(&mut self) {
        self.scroll_by(-1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_by(1);
    }

    pub fn scroll_top(&mut self) {
        self.selected = 0;
    }

    pub fn scroll_bottom(&mut self) {
        self.selected = self.row_count.saturating_sub(1);
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.visible as isize);
    }

    /// Jumps to the first visible row first; a second press scrolls a page.
    pub fn page_up(&mut self) {
        if self.selected > self.top {
            self.selected = self.top;
        } else {
            self.scroll_by(-(self.visible as isize));
        }
    }

    pub fn half_page_down(&mut self) {
        self.scroll_by((self.visible / 2) as isize);
    }

    pub fn half_page_up(&mut self) {
        self.scroll_by(-((self.visible / 2) as isize));
    }

    pub fn recompute_window(&mut self, visible: usize) {
        self.visible = visible;
        if visible > 0 {
            if self.selected >= self.top + visible {
                self.top = self.selected + 1 - visible;
            } else if self.selected < self.top {
                self.top = self.selected;
            }
        }
        self.top = self.top.min(self.max_top());
    }

    pub fn more_above(&self) -> bool {
        self.top > 0
    }

    pub fn more_below(&self) -> bool {
        self.top + self.visible < self.row_count
    }

    /// Row indices currently inside the window.
    pub fn window(&self) -> std::ops::Range<usize> {
        let end = (self.top + self.visible).min(self.row_count);
        self.top.min(end)..end
    }

    fn max_top(&self) -> usize {
        self.row_count.saturating_sub(self.visible)
    }
}
