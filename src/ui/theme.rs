use ratatui::style::{Color, Modifier, Style};

use crate::app::config::ThemeConfig;

pub const COLOR_PALETTE: &[(&str, Color)] = &[
    ("Gray", Color::Gray),
    ("Dark Gray", Color::DarkGray),
    ("Red", Color::Red),
    ("Light Red", Color::LightRed),
    ("Green", Color::Green),
    ("Light Green", Color::LightGreen),
    ("Yellow", Color::Yellow),
    ("Light Yellow", Color::LightYellow),
    ("Blue", Color::Blue),
    ("Light Blue", Color::LightBlue),
    ("Magenta", Color::Magenta),
    ("Light Magenta", Color::LightMagenta),
    ("Cyan", Color::Cyan),
    ("Light Cyan", Color::LightCyan),
    ("White", Color::White),
    ("Black", Color::Black),
];

/// Resolve a color name such as `light_blue`, `Light Blue` or `#ff8800`.
/// `default`/`reset` map to the terminal's own color; unknown names fall back
/// to gray.
pub fn parse_color(name: &str) -> Color {
    let trimmed = name.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        if hex.len() == 6 {
            if let Ok(rgb) = u32::from_str_radix(hex, 16) {
                return Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8);
            }
        }
    }

    let lower = trimmed.to_lowercase().replace(['_', '-'], " ");
    if lower == "default" || lower == "reset" {
        return Color::Reset;
    }
    for (label, color) in COLOR_PALETTE {
        if label.to_lowercase().replace(' ', "") == lower.replace(' ', "") {
            return *color;
        }
    }
    Color::Gray
}

/// Colors and styles shared by every widget, resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub nominal: Color,
    pub critical: Color,
    pub selected: Color,
    pub border: Color,
    pub text: Color,
    pub series: Vec<Color>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Self {
        let mut series: Vec<Color> = config.series.iter().map(|c| parse_color(c)).collect();
        if series.is_empty() {
            series.push(Color::Cyan);
        }
        Self {
            nominal: parse_color(&config.nominal),
            critical: parse_color(&config.critical),
            selected: parse_color(&config.selected),
            border: parse_color(&config.border),
            text: parse_color(&config.text),
            series,
        }
    }

    pub fn text_style(&self) -> Style {
        Style::default().fg(self.text)
    }

    pub fn title_style(&self) -> Style {
        self.text_style().add_modifier(Modifier::BOLD)
    }

    pub fn selected_row_style(&self) -> Style {
        Style::default()
            .fg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn marker_style(&self) -> Style {
        Style::default().add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.selected)
        } else {
            Style::default().fg(self.border)
        }
    }

    /// Stable color for a plot slot.
    pub fn series_color(&self, slot: usize) -> Color {
        self.series[slot % self.series.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default())
    }
}
