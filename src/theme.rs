//! Theme support: two built-in palettes plus an auto mode that follows the
//! system appearance.

use gpui::*;

/// Theme mode preference, persisted as a plain string under the `theme` key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    Auto,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
            ThemeMode::Auto => "auto",
        }
    }

    pub fn parse(s: &str) -> ThemeMode {
        match s.trim() {
            "light" => ThemeMode::Light,
            "dark" => ThemeMode::Dark,
            _ => ThemeMode::Auto,
        }
    }
}

/// All UI colors in one struct.
#[derive(Clone, Copy, Debug)]
pub struct ThemeColors {
    // Background colors
    pub bg_primary: u32,
    pub bg_secondary: u32,
    pub bg_header: u32,
    pub bg_hover: u32,

    // Border colors
    pub border: u32,
    pub border_active: u32,

    // Text colors
    pub text_primary: u32,
    pub text_secondary: u32,
    pub text_muted: u32,

    // Selection colors
    pub selection_bg: u32,
    pub selection_fg: u32,

    // Status colors
    pub success: u32,
    pub warning: u32,
    pub error: u32,
    pub info: u32,

    // Button colors
    pub button_primary_bg: u32,
    pub button_primary_fg: u32,
    pub button_primary_hover: u32,
}

/// Dark theme (VSCode-like)
pub const DARK_THEME: ThemeColors = ThemeColors {
    bg_primary: 0x1e1e1e,
    bg_secondary: 0x252526,
    bg_header: 0x323233,
    bg_hover: 0x2a2d2e,
    border: 0x3c3c3c,
    border_active: 0x007acc,
    text_primary: 0xcccccc,
    text_secondary: 0x808080,
    text_muted: 0x6a6a6a,
    selection_bg: 0x264f78,
    selection_fg: 0xffffff,
    success: 0x4ec9b0,
    warning: 0xe5a100,
    error: 0xf48771,
    info: 0x569cd6,
    button_primary_bg: 0x0e639c,
    button_primary_fg: 0xffffff,
    button_primary_hover: 0x1177bb,
};

/// Clean light theme
pub const LIGHT_THEME: ThemeColors = ThemeColors {
    bg_primary: 0xffffff,
    bg_secondary: 0xf3f3f3,
    bg_header: 0xe8e8e8,
    bg_hover: 0xe8e8e8,
    border: 0xd4d4d4,
    border_active: 0x0066b8,
    text_primary: 0x1f1f1f,
    text_secondary: 0x616161,
    text_muted: 0x8c8c8c,
    selection_bg: 0xadd6ff,
    selection_fg: 0x1f1f1f,
    success: 0x14825d,
    warning: 0xbf8803,
    error: 0xcd3131,
    info: 0x0066b8,
    button_primary_bg: 0x0066b8,
    button_primary_fg: 0xffffff,
    button_primary_hover: 0x0077d4,
};

/// Create an hsla color from a hex color with custom alpha
pub fn with_alpha(hex: u32, alpha: f32) -> Hsla {
    let rgba = rgb(hex);
    Hsla::from(Rgba { a: alpha, ..rgba })
}

/// Global theme state
pub struct AppTheme {
    pub mode: ThemeMode,
    pub colors: ThemeColors,
    system_is_dark: bool,
}

impl AppTheme {
    pub fn new(mode: ThemeMode, system_is_dark: bool) -> Self {
        Self {
            mode,
            colors: Self::colors_for_mode(mode, system_is_dark),
            system_is_dark,
        }
    }

    fn colors_for_mode(mode: ThemeMode, system_is_dark: bool) -> ThemeColors {
        match mode {
            ThemeMode::Dark => DARK_THEME,
            ThemeMode::Light => LIGHT_THEME,
            ThemeMode::Auto => {
                if system_is_dark {
                    DARK_THEME
                } else {
                    LIGHT_THEME
                }
            }
        }
    }

    pub fn set_mode(&mut self, mode: ThemeMode) {
        self.mode = mode;
        self.update_colors();
    }

    pub fn set_system_appearance(&mut self, is_dark: bool) {
        self.system_is_dark = is_dark;
        if self.mode == ThemeMode::Auto {
            self.update_colors();
        }
    }

    fn update_colors(&mut self) {
        self.colors = Self::colors_for_mode(self.mode, self.system_is_dark);
    }
}

/// Wrapper for global theme entity
pub struct GlobalTheme(pub Entity<AppTheme>);

impl Global for GlobalTheme {}

/// Get the current theme colors from the global theme entity
pub fn theme(cx: &App) -> ThemeColors {
    cx.global::<GlobalTheme>().0.read(cx).colors
}

/// Get the theme entity for observation
pub fn theme_entity(cx: &App) -> Entity<AppTheme> {
    cx.global::<GlobalTheme>().0.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_mode_string_round_trip() {
        for mode in [ThemeMode::Light, ThemeMode::Dark, ThemeMode::Auto] {
            assert_eq!(ThemeMode::parse(mode.as_str()), mode);
        }
    }

    #[test]
    fn unknown_mode_falls_back_to_auto() {
        assert_eq!(ThemeMode::parse("solarized"), ThemeMode::Auto);
        assert_eq!(ThemeMode::parse(""), ThemeMode::Auto);
    }

    #[test]
    fn auto_mode_follows_system_appearance() {
        let mut theme = AppTheme::new(ThemeMode::Auto, true);
        assert_eq!(theme.colors.bg_primary, DARK_THEME.bg_primary);
        theme.set_system_appearance(false);
        assert_eq!(theme.colors.bg_primary, LIGHT_THEME.bg_primary);
    }

    #[test]
    fn explicit_mode_ignores_system_appearance() {
        let mut theme = AppTheme::new(ThemeMode::Dark, false);
        assert_eq!(theme.colors.bg_primary, DARK_THEME.bg_primary);
        theme.set_system_appearance(false);
        assert_eq!(theme.colors.bg_primary, DARK_THEME.bg_primary);
    }
}
