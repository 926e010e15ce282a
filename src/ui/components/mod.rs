pub mod gauge_list;
pub mod resource_list;
pub mod series_plot;
pub mod status_bar;
pub mod text_list;

pub use gauge_list::{GaugeItem, GaugeList};
pub use resource_list::ResourceList;
pub use series_plot::SeriesPlot;
pub use status_bar::StatusBarWidget;
pub use text_list::TextList;

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Widget},
};

use super::canvas::Canvas;
use super::theme::Theme;
use super::viewport::Viewport;

/// The scrolling surface every list-like widget shares.
///
/// Implementors only expose their [`Viewport`] and a draw routine; scrolling
/// is the same for all of them.
pub trait Scrollable {
    fn viewport(&self) -> &Viewport;
    fn viewport_mut(&mut self) -> &mut Viewport;

    /// Draw into `area`. Must recompute the window before drawing rows.
    fn draw(&mut self, canvas: &mut Canvas, area: Rect, focused: bool);

    fn scroll_by(&mut self, amount: isize) {
        self.viewport_mut().scroll_by(amount);
    }

    fn scroll_up(&mut self) {
        self.scroll_by(-1);
    }

    fn scroll_down(&mut self) {
        self.scroll_by(1);
    }

    fn scroll_top(&mut self) {
        self.viewport_mut().scroll_top();
    }

    fn scroll_bottom(&mut self) {
        self.viewport_mut().scroll_bottom();
    }

    fn page_up(&mut self) {
        self.viewport_mut().page_up();
    }

    fn page_down(&mut self) {
        self.viewport_mut().page_down();
    }

    fn half_page_up(&mut self) {
        self.viewport_mut().half_page_up();
    }

    fn half_page_down(&mut self) {
        self.viewport_mut().half_page_down();
    }

    fn recompute_window(&mut self, visible: usize) {
        self.viewport_mut().recompute_window(visible);
    }

    fn selected(&self) -> Option<usize> {
        self.viewport().selected()
    }
}

/// Draw the bordered, titled frame of a widget and return its inner area.
pub fn draw_frame(canvas: &mut Canvas, area: Rect, title: &str, theme: &Theme, focused: bool) -> Rect {
    let area = area.intersection(canvas.clip());
    if area.width < 2 || area.height < 2 {
        return Rect::new(area.x, area.y, 0, 0);
    }
    let block = Block::bordered()
        .title(Line::styled(format!(" {} ", title), theme.title_style()))
        .border_style(theme.border_style(focused));
    let inner = block.inner(area);
    block.render(area, canvas.buffer_mut());
    inner
}
