use crate::align::HighlightSet;
use crate::state::Theme;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Outbound {
    Highlight {
        diffs: HighlightSet,
    },
    SyncScroll {
        #[serde(rename = "scrollPercent")]
        scroll_percent: f64,
    },
    UpdateZoom {
        zoom: f32,
    },
    ToggleOutline {
        visible: bool,
    },
    UpdateTheme {
        theme: Theme,
    },
    ToggleToolbar {
        visible: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Inbound {
    Scroll {
        #[serde(rename = "scrollPercent")]
        scroll_percent: f64,
    },
    ZoomChanged {
        zoom: f32,
    },
    OutlineToggled {
        visible: bool,
    },
    ThemeChanged {
        theme: Theme,
    },
    ToolbarToggled {
        visible: bool,
    },
    Error {
        message: String,
    },
    Info {
        message: String,
    },
}
