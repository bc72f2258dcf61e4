use crate::state::{Theme, DEFAULT_ZOOM};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub font: String,
    pub theme: Theme,
    pub zoom_level: f32,
    pub show_outline: bool,
    pub show_toolbar: bool,
    pub outline_width: u16,
    pub wrap: bool,
    pub max_diff_blocks: usize,
    pub search_case_sensitive: bool,
    // Prints HTML for a .docx/.odt path appended as the last argument.
    pub converter: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font: "Arial".to_string(),
            theme: Theme::Auto,
            zoom_level: DEFAULT_ZOOM,
            show_outline: true,
            show_toolbar: true,
            outline_width: 28,
            wrap: true,
            max_diff_blocks: 2000,
            search_case_sensitive: false,
            converter: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PartialConfig {
    font: Option<String>,
    theme: Option<Theme>,
    zoom_level: Option<f32>,
    show_outline: Option<bool>,
    show_toolbar: Option<bool>,
    outline_width: Option<u16>,
    wrap: Option<bool>,
    max_diff_blocks: Option<usize>,
    search_case_sensitive: Option<bool>,
    converter: Option<String>,
}

fn fill<T>(value: Option<T>, default: T, changed: &mut bool) -> T {
    match value {
        Some(v) => v,
        None => {
            *changed = true;
            default
        }
    }
}

impl PartialConfig {
    fn apply_defaults(self) -> (Config, bool) {
        let defaults = Config::default();
        let mut changed = false;

        let config = Config {
            font: fill(self.font, defaults.font, &mut changed),
            theme: fill(self.theme, defaults.theme, &mut changed),
            zoom_level: fill(self.zoom_level, defaults.zoom_level, &mut changed),
            show_outline: fill(self.show_outline, defaults.show_outline, &mut changed),
            show_toolbar: fill(self.show_toolbar, defaults.show_toolbar, &mut changed),
            outline_width: fill(self.outline_width, defaults.outline_width, &mut changed),
            wrap: fill(self.wrap, defaults.wrap, &mut changed),
            max_diff_blocks: fill(self.max_diff_blocks, defaults.max_diff_blocks, &mut changed),
            search_case_sensitive: fill(
                self.search_case_sensitive,
                defaults.search_case_sensitive,
                &mut changed,
            ),
            // No default to write back; absence is meaningful.
            converter: self.converter,
        };

        (config, changed)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join("docpane").join("config.toml"))
}

pub fn ensure_config_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        let cfg = Config::default();
        write_config_to(path, &cfg)?;
        return Ok(cfg);
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let partial: PartialConfig = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    let (cfg, changed) = partial.apply_defaults();
    if changed {
        write_config_to(path, &cfg)?;
    }
    Ok(cfg)
}

pub fn write_config_to(path: &Path, cfg: &Config) -> Result<()> {
    ensure_config_dir(path)?;
    let text = toml::to_string_pretty(cfg).context("Failed to serialize config")?;
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub fn open_config_in_editor() -> Result<()> {
    let path = config_path()?;
    if !path.exists() {
        write_config_to(&path, &Config::default())?;
    }

    let editor = env::var("EDITOR").unwrap_or_else(|_| "nvim".to_string());
    let mut parts = match shell_words::split(&editor) {
        Ok(p) if !p.is_empty() => p,
        _ => vec![editor],
    };
    let cmd = parts.remove(0);
    let status = Command::new(cmd)
        .args(parts)
        .arg(&path)
        .status()
        .with_context(|| format!("Failed to launch editor for {}", path.display()))?;
    if !status.success() {
        anyhow::bail!("Editor exited with status {}", status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_config_from, Config};
    use crate::state::Theme;
    use std::fs;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.font, "Arial");
        assert!(path.exists());
    }

    #[test]
    fn partial_file_is_completed_and_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = \"dark\"\nzoom_level = 1.5\n").unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.theme, Theme::Dark);
        assert_eq!(cfg.zoom_level, 1.5);
        assert_eq!(cfg.max_diff_blocks, Config::default().max_diff_blocks);

        assert!(!cfg.search_case_sensitive);

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("show_outline = true"));
        assert!(rewritten.contains("search_case_sensitive = false"));
        assert!(rewritten.contains("theme = \"dark\""));
    }

    #[test]
    fn converter_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "converter = \"pandoc --to html\"\n").unwrap();
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.converter.as_deref(), Some("pandoc --to html"));
        let again = load_config_from(&path).unwrap();
        assert_eq!(again.converter.as_deref(), Some("pandoc --to html"));
    }

    #[test]
    fn invalid_theme_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "theme = \"sepia\"\n").unwrap();
        let err = load_config_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse"));
    }

    #[test]
    fn search_case_sensitivity_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "search_case_sensitive = true\nfont = \"Georgia\"\n").unwrap();
        let cfg = load_config_from(&path).unwrap();
        assert!(cfg.search_case_sensitive);
        assert_eq!(cfg.font, "Georgia");
    }
}
