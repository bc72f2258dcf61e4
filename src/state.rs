use crate::config::Config;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 3.0;
pub const DEFAULT_ZOOM: f32 = 1.0;
const ZOOM_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Theme::Auto => Theme::Light,
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Auto,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::Auto => "auto",
            Theme::Light => "light",
            Theme::Dark => "dark",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentState {
    zoom: f32,
    pub outline_visible: bool,
    pub theme: Theme,
    pub toolbar_visible: bool,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            outline_visible: true,
            theme: Theme::Auto,
            toolbar_visible: true,
        }
    }
}

impl DocumentState {
    pub fn from_config(cfg: &Config) -> Self {
        let mut state = Self {
            zoom: DEFAULT_ZOOM,
            outline_visible: cfg.show_outline,
            theme: cfg.theme,
            toolbar_visible: cfg.show_toolbar,
        };
        state.set_zoom(cfg.zoom_level);
        state
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    // Clamped to the supported range. Non-finite input is ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        if self.zoom >= MAX_ZOOM {
            return false;
        }
        self.zoom = round_step(self.zoom + ZOOM_STEP).min(MAX_ZOOM);
        true
    }

    pub fn zoom_out(&mut self) -> bool {
        if self.zoom <= MIN_ZOOM {
            return false;
        }
        self.zoom = round_step(self.zoom - ZOOM_STEP).max(MIN_ZOOM);
        true
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = DEFAULT_ZOOM;
    }

    pub fn zoom_percent(&self) -> u32 {
        (self.zoom * 100.0).round() as u32
    }

    pub fn toggle_outline(&mut self) -> bool {
        self.outline_visible = !self.outline_visible;
        self.outline_visible
    }

    pub fn toggle_toolbar(&mut self) -> bool {
        self.toolbar_visible = !self.toolbar_visible;
        self.toolbar_visible
    }

    pub fn cycle_theme(&mut self) -> Theme {
        self.theme = self.theme.next();
        self.theme
    }
}

// Repeated 0.1 steps drift in binary floating point; snap to one decimal.
fn round_step(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}
