use crate::state::Theme;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct UiPalette {
    pub base_fg: Color,
    pub base_bg: Option<Color>,
    pub accent: Color,
    pub muted: Color,
    pub border: Color,
    pub added_bg: Color,
    pub removed_bg: Color,
    pub search_bg: Color,
    pub search_current_bg: Color,
}

impl UiPalette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            // Follow the terminal's own colors.
            Theme::Auto => Self {
                base_fg: Color::Reset,
                base_bg: None,
                accent: Color::Cyan,
                muted: Color::DarkGray,
                border: Color::DarkGray,
                added_bg: Color::Rgb(30, 80, 40),
                removed_bg: Color::Rgb(100, 35, 35),
                search_bg: Color::Rgb(90, 80, 20),
                search_current_bg: Color::Rgb(170, 120, 20),
            },
            Theme::Light => Self {
                base_fg: Color::Rgb(36, 41, 47),
                base_bg: Some(Color::Rgb(250, 250, 248)),
                accent: Color::Rgb(9, 105, 218),
                muted: Color::Rgb(110, 119, 129),
                border: Color::Rgb(175, 184, 193),
                added_bg: Color::Rgb(218, 251, 225),
                removed_bg: Color::Rgb(255, 220, 215),
                search_bg: Color::Rgb(255, 241, 168),
                search_current_bg: Color::Rgb(255, 197, 95),
            },
            Theme::Dark => Self {
                base_fg: Color::Rgb(201, 209, 217),
                base_bg: Some(Color::Rgb(22, 27, 34)),
                accent: Color::Rgb(88, 166, 255),
                muted: Color::Rgb(110, 118, 129),
                border: Color::Rgb(48, 54, 61),
                added_bg: Color::Rgb(18, 61, 33),
                removed_bg: Color::Rgb(90, 30, 30),
                search_bg: Color::Rgb(82, 70, 16),
                search_current_bg: Color::Rgb(158, 106, 3),
            },
        }
    }

    pub fn base_style(&self) -> Style {
        let style = Style::default().fg(self.base_fg);
        match self.base_bg {
            Some(bg) => style.bg(bg),
            None => style,
        }
    }

    pub fn heading_style(&self, level: u8) -> Style {
        let style = self.base_style().fg(self.accent).add_modifier(Modifier::BOLD);
        if level <= 2 {
            style.add_modifier(Modifier::UNDERLINED)
        } else {
            style
        }
    }

    pub fn highlight_style(&self) -> Style {
        let fg = self.base_bg.unwrap_or(Color::Black);
        Style::default().bg(self.accent).fg(fg)
    }
}
