//! Theme system for the procmon TUI.
//!
//! Provides color themes with runtime switching and a small persisted
//! preference file.

use ratatui::style::Color;
use std::fs;
use std::path::PathBuf;

/// Theme name identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeName {
    /// Default dark theme
    #[default]
    Default,
    /// Light theme (for bright environments)
    Light,
    /// High-contrast monochrome-green theme
    Matrix,
}

impl ThemeName {
    /// All available themes in cycle order.
    pub fn all() -> &'static [ThemeName] {
        &[ThemeName::Default, ThemeName::Light, ThemeName::Matrix]
    }

    /// Get the next theme in the cycle.
    pub fn next(&self) -> ThemeName {
        let themes = Self::all();
        let current_idx = themes.iter().position(|t| t == self).unwrap_or(0);
        themes[(current_idx + 1) % themes.len()]
    }

    /// Get the display name for this theme.
    pub fn display_name(&self) -> &'static str {
        match self {
            ThemeName::Default => "Default",
            ThemeName::Light => "Light",
            ThemeName::Matrix => "Matrix",
        }
    }

    /// Parse a theme name from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "default" => Some(ThemeName::Default),
            "light" => Some(ThemeName::Light),
            "matrix" => Some(ThemeName::Matrix),
            _ => None,
        }
    }
}

/// Color palette for a theme.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    /// Primary headers and focused borders
    pub header: Color,
    /// Hotkey hints
    pub hotkey: Color,
    /// Normal text
    pub text: Color,
    /// Secondary text (timestamps, dim info)
    pub text_dim: Color,
    /// Unfocused borders
    pub border_dim: Color,
    /// Focused/active element accent
    pub accent: Color,
    /// Status: running/healthy
    pub status_healthy: Color,
    /// Status: non-running/warning
    pub status_warning: Color,
    /// Status: error
    pub status_error: Color,
}

/// Complete theme definition.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Theme name
    pub name: ThemeName,
    /// Color palette
    pub colors: ThemeColors,
}

impl Theme {
    /// Create the default dark theme.
    pub fn default_theme() -> Self {
        Self {
            name: ThemeName::Default,
            colors: ThemeColors {
                header: Color::Cyan,
                hotkey: Color::Yellow,
                text: Color::White,
                text_dim: Color::Gray,
                border_dim: Color::DarkGray,
                accent: Color::Cyan,
                status_healthy: Color::Green,
                status_warning: Color::Yellow,
                status_error: Color::Red,
            },
        }
    }

    /// Create the light theme.
    pub fn light_theme() -> Self {
        Self {
            name: ThemeName::Light,
            colors: ThemeColors {
                header: Color::Blue,
                hotkey: Color::Magenta,
                text: Color::Black,
                text_dim: Color::DarkGray,
                border_dim: Color::Gray,
                accent: Color::Blue,
                status_healthy: Color::Green,
                status_warning: Color::Rgb(180, 120, 0),
                status_error: Color::Red,
            },
        }
    }

    /// Create the matrix theme.
    pub fn matrix_theme() -> Self {
        Self {
            name: ThemeName::Matrix,
            colors: ThemeColors {
                header: Color::LightGreen,
                hotkey: Color::Green,
                text: Color::Green,
                text_dim: Color::Rgb(0, 120, 0),
                border_dim: Color::Rgb(0, 90, 0),
                accent: Color::LightGreen,
                status_healthy: Color::LightGreen,
                status_warning: Color::Yellow,
                status_error: Color::Red,
            },
        }
    }

    /// Get a theme by name.
    pub fn by_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Default => Self::default_theme(),
            ThemeName::Light => Self::light_theme(),
            ThemeName::Matrix => Self::matrix_theme(),
        }
    }
}

/// Manages the active theme and its persisted preference.
#[derive(Debug, Clone)]
pub struct ThemeManager {
    current: Theme,
}

impl Default for ThemeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeManager {
    /// Create a manager with the default theme.
    pub fn new() -> Self {
        Self {
            current: Theme::default_theme(),
        }
    }

    /// Create a manager with a specific theme.
    pub fn with_theme(theme: Theme) -> Self {
        Self { current: theme }
    }

    /// The active theme.
    pub fn current(&self) -> &Theme {
        &self.current
    }

    /// Switch to the next theme in the cycle and return its name.
    pub fn cycle_theme(&mut self) -> ThemeName {
        let next = self.current.name.next();
        self.current = Theme::by_name(next);
        next
    }

    /// Load the persisted theme preference, falling back to the default.
    pub fn load_config() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::new(),
        }
    }

    /// Load a theme preference from a specific file.
    ///
    /// A missing or unparseable file yields the default theme.
    pub fn load_from(path: &std::path::Path) -> Self {
        if let Ok(content) = fs::read_to_string(path) {
            if let Some(name) = parse_theme_config(&content) {
                tracing::debug!(theme = name.display_name(), "loaded theme preference");
                return Self::with_theme(Theme::by_name(name));
            }
        }
        Self::new()
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".procmon").join("theme.toml"))
}

/// Parse the theme preference file.
///
/// Manual parse of the single `current_theme = "name"` line; the file is
/// too small to justify a toml dependency.
fn parse_theme_config(content: &str) -> Option<ThemeName> {
    content.lines().find_map(|line| {
        let line = line.trim();
        if line.starts_with("current_theme") {
            line.split('=')
                .nth(1)
                .map(|s| s.trim().trim_matches('"'))
                .and_then(ThemeName::from_str)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_cycle_wraps() {
        let mut manager = ThemeManager::new();
        assert_eq!(manager.cycle_theme(), ThemeName::Light);
        assert_eq!(manager.cycle_theme(), ThemeName::Matrix);
        assert_eq!(manager.cycle_theme(), ThemeName::Default);
    }

    #[test]
    fn test_theme_name_from_str() {
        assert_eq!(ThemeName::from_str("light"), Some(ThemeName::Light));
        assert_eq!(ThemeName::from_str("MATRIX"), Some(ThemeName::Matrix));
        assert_eq!(ThemeName::from_str("neon"), None);
    }

    #[test]
    fn test_parse_theme_config() {
        assert_eq!(
            parse_theme_config("current_theme = \"matrix\"\n"),
            Some(ThemeName::Matrix)
        );
        assert_eq!(parse_theme_config("current_theme = \"nope\""), None);
        assert_eq!(parse_theme_config(""), None);
    }

    #[test]
    fn test_by_name_roundtrip() {
        for name in ThemeName::all() {
            assert_eq!(Theme::by_name(*name).name, *name);
        }
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("theme.toml");

        fs::write(&path, "current_theme = \"light\"\n").unwrap();
        assert_eq!(ThemeManager::load_from(&path).current().name, ThemeName::Light);

        // Missing or garbled files fall back to the default
        assert_eq!(
            ThemeManager::load_from(&dir.path().join("absent.toml")).current().name,
            ThemeName::Default
        );
        fs::write(&path, "current_theme = \"???\"").unwrap();
        assert_eq!(ThemeManager::load_from(&path).current().name, ThemeName::Default);
    }
}
