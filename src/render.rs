use async_trait::async_trait;
use pulldown_cmark::{html, Options, Parser};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported format: {0}")]
    Unsupported(String),

    #[error("Could not decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("Converter failed for {}: {reason}", .path.display())]
    Converter { path: PathBuf, reason: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

// Callers stay on one thread, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait Renderer {
    async fn render_to_markup(&self, source: &Path) -> Result<String, RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Html,
    Markdown,
    Text,
    Office,
}

fn detect_format(path: &Path) -> Result<Format, RenderError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => Ok(Format::Html),
        "md" | "markdown" => Ok(Format::Markdown),
        "txt" => Ok(Format::Text),
        "docx" | "odt" => Ok(Format::Office),
        "" => Err(RenderError::Unsupported(format!("{} has no extension", path.display()))),
        other => Err(RenderError::Unsupported(format!(".{other} files are not supported"))),
    }
}

// Office formats go through an external converter that writes HTML to stdout.
#[derive(Debug, Clone, Default)]
pub struct FsRenderer {
    converter: Option<String>,
}

impl FsRenderer {
    pub fn new(converter: Option<String>) -> Self {
        Self { converter }
    }

    async fn read_text(&self, path: &Path) -> Result<String, RenderError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| io_error(path, source))?;
        String::from_utf8(bytes).map_err(|err| RenderError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    async fn convert(&self, path: &Path) -> Result<String, RenderError> {
        let Some(command_line) = self.converter.as_deref() else {
            return Err(RenderError::Unsupported(format!(
                "no converter configured for {}",
                path.display()
            )));
        };
        let mut parts = shell_words::split(command_line).map_err(|err| RenderError::Converter {
            path: path.to_path_buf(),
            reason: format!("invalid converter command: {err}"),
        })?;
        if parts.is_empty() {
            return Err(RenderError::Converter {
                path: path.to_path_buf(),
                reason: "converter command is empty".to_string(),
            });
        }
        let program = parts.remove(0);
        log::debug!("converting {} with {program}", path.display());
        let output = Command::new(&program)
            .args(&parts)
            .arg(path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|err| RenderError::Converter {
                path: path.to_path_buf(),
                reason: format!("could not run {program}: {err}"),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Converter {
                path: path.to_path_buf(),
                reason: format!("{program} exited with {}: {}", output.status, stderr.trim()),
            });
        }
        String::from_utf8(output.stdout).map_err(|err| RenderError::Decode {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }
}

#[async_trait(?Send)]
impl Renderer for FsRenderer {
    async fn render_to_markup(&self, source: &Path) -> Result<String, RenderError> {
        if !tokio::fs::try_exists(source).await.unwrap_or(false) {
            return Err(RenderError::NotFound(source.to_path_buf()));
        }
        match detect_format(source)? {
            Format::Html => self.read_text(source).await,
            Format::Markdown => Ok(markdown_to_html(&self.read_text(source).await?)),
            Format::Text => Ok(text_to_html(&self.read_text(source).await?)),
            Format::Office => self.convert(source).await,
        }
    }
}

fn io_error(path: &Path, source: io::Error) -> RenderError {
    if source.kind() == io::ErrorKind::NotFound {
        RenderError::NotFound(path.to_path_buf())
    } else {
        RenderError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub fn markdown_to_html(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let parser = Parser::new_ext(input, options);
    let mut out = String::with_capacity(input.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

pub fn text_to_html(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");
    normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| format!("<p>{}</p>\n", escape_html(chunk)))
        .collect()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
