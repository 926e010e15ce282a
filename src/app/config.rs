use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub keybinds: Keybinds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_ms: u64,
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    #[serde(default = "default_true")]
    pub show_plot: bool,
    #[serde(default = "default_true")]
    pub show_log: bool,
    #[serde(default)]
    pub debug_log: bool,
}

fn default_true() -> bool {
    true
}

fn default_tick_rate() -> u64 {
    1000
}

fn default_poll_timeout() -> u64 {
    3000
}

fn default_history_size() -> usize {
    600
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            poll_timeout_ms: default_poll_timeout(),
            history_size: default_history_size(),
            show_plot: default_true(),
            show_log: default_true(),
            debug_log: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Cpu,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
    #[serde(default)]
    pub sort: SortKey,
}

fn default_max_rows() -> usize {
    40
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
            sort: SortKey::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default = "default_nominal")]
    pub nominal: String,
    #[serde(default = "default_critical")]
    pub critical: String,
    #[serde(default = "default_selected")]
    pub selected: String,
    #[serde(default = "default_border")]
    pub border: String,
    #[serde(default = "default_text")]
    pub text: String,
    #[serde(default = "default_series")]
    pub series: Vec<String>,
}

fn default_nominal() -> String {
    "green".to_string()
}

fn default_critical() -> String {
    "red".to_string()
}

fn default_selected() -> String {
    "yellow".to_string()
}

fn default_border() -> String {
    "gray".to_string()
}

fn default_text() -> String {
    "default".to_string()
}

fn default_series() -> Vec<String> {
    [
        "light_blue",
        "light_magenta",
        "light_green",
        "light_yellow",
        "light_cyan",
        "light_red",
        "blue",
        "magenta",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            nominal: default_nominal(),
            critical: default_critical(),
            selected: default_selected(),
            border: default_border(),
            text: default_text(),
            series: default_series(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Keybind {
    pub key: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
}

impl Keybind {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Vec::new(),
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Vec<String>) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    pub fn ctrl(key: impl Into<String>) -> Self {
        Self::with_modifiers(key, vec!["Control".to_string()])
    }

    pub fn shift(key: impl Into<String>) -> Self {
        Self::with_modifiers(key, vec!["Shift".to_string()])
    }

    pub fn display_short(&self) -> String {
        let key_display = match self.key.as_str() {
            "Up" => "↑".to_string(),
            "Down" => "↓".to_string(),
            "Tab" => "⇥".to_string(),
            "PageUp" => "PgUp".to_string(),
            "PageDown" => "PgDn".to_string(),
            k => k.to_string(),
        };
        if self.modifiers.is_empty() {
            key_display
        } else {
            let mods: String = self
                .modifiers
                .iter()
                .map(|m| match m.as_str() {
                    "Control" => "C-".to_string(),
                    "Shift" => "S-".to_string(),
                    "Alt" => "M-".to_string(),
                    _ => format!("{}-", m.chars().next().unwrap_or('?')),
                })
                .collect();
            format!("{}{}", mods, key_display)
        }
    }
}

/// Every action accepts several bindings. Bindings from the config file are
/// added on top of the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keybinds {
    #[serde(default = "default_quit")]
    pub quit: Vec<Keybind>,
    #[serde(default = "default_down")]
    pub down: Vec<Keybind>,
    #[serde(default = "default_up")]
    pub up: Vec<Keybind>,
    #[serde(default = "default_page_down")]
    pub page_down: Vec<Keybind>,
    #[serde(default = "default_page_up")]
    pub page_up: Vec<Keybind>,
    #[serde(default = "default_half_page_down")]
    pub half_page_down: Vec<Keybind>,
    #[serde(default = "default_half_page_up")]
    pub half_page_up: Vec<Keybind>,
    #[serde(default = "default_top")]
    pub top: Vec<Keybind>,
    #[serde(default = "default_bottom")]
    pub bottom: Vec<Keybind>,
    #[serde(default = "default_focus_next")]
    pub focus_next: Vec<Keybind>,
}

fn default_quit() -> Vec<Keybind> {
    vec![Keybind::new("q"), Keybind::ctrl("c")]
}

fn default_down() -> Vec<Keybind> {
    vec![Keybind::new("j"), Keybind::new("Down")]
}

fn default_up() -> Vec<Keybind> {
    vec![Keybind::new("k"), Keybind::new("Up")]
}

fn default_page_down() -> Vec<Keybind> {
    vec![Keybind::new("PageDown"), Keybind::ctrl("f")]
}

fn default_page_up() -> Vec<Keybind> {
    vec![Keybind::new("PageUp"), Keybind::ctrl("b")]
}

fn default_half_page_down() -> Vec<Keybind> {
    vec![Keybind::ctrl("d")]
}

fn default_half_page_up() -> Vec<Keybind> {
    vec![Keybind::ctrl("u")]
}

fn default_top() -> Vec<Keybind> {
    vec![Keybind::new("g"), Keybind::new("Home")]
}

fn default_bottom() -> Vec<Keybind> {
    vec![Keybind::shift("g"), Keybind::new("End")]
}

fn default_focus_next() -> Vec<Keybind> {
    vec![Keybind::new("Tab")]
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            down: default_down(),
            up: default_up(),
            page_down: default_page_down(),
            page_up: default_page_up(),
            half_page_down: default_half_page_down(),
            half_page_up: default_half_page_up(),
            top: default_top(),
            bottom: default_bottom(),
            focus_next: default_focus_next(),
        }
    }
}

impl Keybinds {
    /// Re-add any default binding the config file left out.
    pub fn with_defaults(mut self) -> Self {
        let defaults = Keybinds::default();
        let pairs = [
            (&mut self.quit, defaults.quit),
            (&mut self.down, defaults.down),
            (&mut self.up, defaults.up),
            (&mut self.page_down, defaults.page_down),
            (&mut self.page_up, defaults.page_up),
            (&mut self.half_page_down, defaults.half_page_down),
            (&mut self.half_page_up, defaults.half_page_up),
            (&mut self.top, defaults.top),
            (&mut self.bottom, defaults.bottom),
            (&mut self.focus_next, defaults.focus_next),
        ];
        for (binds, default_binds) in pairs {
            for bind in default_binds {
                if !binds.contains(&bind) {
                    binds.push(bind);
                }
            }
        }
        self
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Config = if path.exists() {
            let content =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        Ok(config.normalized())
    }

    fn normalized(mut self) -> Self {
        self.keybinds = self.keybinds.with_defaults();
        self.ui.tick_rate_ms = self.ui.tick_rate_ms.max(50);
        self.ui.poll_timeout_ms = self.ui.poll_timeout_ms.max(1);
        self.source.max_rows = self.source.max_rows.max(1);
        self
    }

    pub fn config_dir() -> Result<PathBuf> {
        let dir = dirs::home_dir()
            .context("Could not find home directory")?
            .join(".ptop");
        Ok(dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn ensure_config_dir() -> Result<PathBuf> {
        let dir = Self::config_dir()?;
        if !dir.exists() {
            std::fs::create_dir_all(&dir).context("Failed to create config directory")?;
        }
        Ok(dir)
    }

    pub fn log_path() -> PathBuf {
        Self::ensure_config_dir()
            .unwrap_or_else(|_| std::env::temp_dir())
            .join("ptop.log")
    }
}
