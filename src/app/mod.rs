pub mod action;
pub mod config;
pub mod event_loop;
pub mod state;

pub use action::Action;
pub use config::{Config, Keybind, Keybinds, SortKey, SourceConfig, ThemeConfig, UiConfig};
pub use event_loop::{
    build_runtime, run, shared_source, shutdown_runtime, spawn_input, spawn_poll, spawn_ticker,
    SharedSource,
};
pub use state::{Dashboard, Focus, LogEntry, LogLevel, WidgetId};
