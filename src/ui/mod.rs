pub mod canvas;
pub mod components;
pub mod grid;
pub mod helpers;
pub mod theme;
pub mod viewport;

pub use canvas::Canvas;
pub use grid::GridNode;
pub use theme::{parse_color, Theme};
pub use viewport::Viewport;
