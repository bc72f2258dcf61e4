use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

const DEFAULT_FILTER: &str = "warn";

pub fn log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("docpane").join("docpane.log"))
}

pub fn init_stderr() {
    let _ = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER)).try_init();
}

// Never writes to the terminal. Without a cache directory records are dropped.
pub fn init_for_tui() -> Result<Option<PathBuf>> {
    let mut builder = Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER));
    let Some(path) = log_path() else {
        builder.target(Target::Pipe(Box::new(std::io::sink())));
        let _ = builder.try_init();
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    builder.target(Target::Pipe(Box::new(file)));
    let _ = builder.try_init();
    Ok(Some(path))
}
