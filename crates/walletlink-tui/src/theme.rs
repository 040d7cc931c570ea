//! Theme support with auto-detection for dark/light terminals.

use ratatui::style::Color;
use walletlink_core::ThemeConfig;

/// Application theme (dark or light).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Detect the terminal theme based on background luminance.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => {
                tracing::info!("Detected light terminal (luma: {:.2})", luma);
                Theme::Light
            }
            Ok(luma) => {
                tracing::info!("Detected dark terminal (luma: {:.2})", luma);
                Theme::Dark
            }
            Err(e) => {
                tracing::debug!("Could not detect terminal theme: {}, defaulting to dark", e);
                Theme::Dark
            }
        }
    }

    /// Theme for a configured preference. Detection only runs for `System`.
    pub fn resolve(config: ThemeConfig) -> Self {
        match config {
            ThemeConfig::System => Self::detect(),
            ThemeConfig::Light => Theme::Light,
            ThemeConfig::Dark => Theme::Dark,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette::dark(),
            Theme::Light => Palette::light(),
        }
    }
}

/// Color palette for the application.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub border: Color,
    /// Border of the focused panel or field.
    pub border_focus: Color,

    pub primary: Color,
    pub accent: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,

    pub highlight: Color,
    pub muted: Color,
    /// Badge for test networks.
    pub testnet: Color,
}

impl Palette {
    /// Dark theme palette (for dark terminal backgrounds).
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            bg: Color::Reset,
            border: Color::DarkGray,
            border_focus: Color::Cyan,

            primary: Color::Cyan,
            accent: Color::Magenta,

            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,

            highlight: Color::Yellow,
            muted: Color::DarkGray,
            testnet: Color::LightBlue,
        }
    }

    /// Light theme palette (for light terminal backgrounds).
    pub fn light() -> Self {
        Self {
            fg: Color::Black,
            bg: Color::Reset,
            border: Color::Gray,
            border_focus: Color::Rgb(0, 128, 128), // Teal

            primary: Color::Rgb(0, 128, 128), // Teal
            accent: Color::Rgb(128, 0, 128),  // Purple

            success: Color::Rgb(0, 128, 0),    // Dark green
            warning: Color::Rgb(184, 134, 11), // Dark goldenrod
            error: Color::Rgb(178, 34, 34),    // Firebrick

            highlight: Color::Rgb(184, 134, 11),
            muted: Color::Gray,
            testnet: Color::Rgb(70, 130, 180), // Steel blue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_default_is_dark() {
        assert_eq!(Theme::default(), Theme::Dark);
    }

    #[test]
    fn test_resolve_explicit_preference() {
        assert_eq!(Theme::resolve(ThemeConfig::Light), Theme::Light);
        assert_eq!(Theme::resolve(ThemeConfig::Dark), Theme::Dark);
    }

    #[test]
    fn test_palettes_have_different_fg() {
        assert_eq!(Theme::Dark.palette().fg, Color::White);
        assert_eq!(Theme::Light.palette().fg, Color::Black);
    }
}
