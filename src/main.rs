mod align;
mod app;
mod blocks;
mod config;
mod coordinator;
mod host;
mod logging;
mod message;
mod outline;
mod registry;
mod render;
mod search;
mod state;
mod stdio;
mod sync;
mod theme;
mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coordinator::Coordinator;
use host::LineHost;
use render::{FsRenderer, Renderer};
use state::DocumentState;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tokio::io::BufReader;
use tokio::task::LocalSet;

#[derive(Parser)]
#[command(name = "docpane", version, about = "Side-by-side document viewer with block diffs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Document to open
    file: Option<PathBuf>,

    /// Open another version of FILE next to it and highlight the differences
    #[arg(long, value_name = "OTHER")]
    against: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the config file in $EDITOR (default: nvim)
    Config,
    /// Compare two documents and print highlight messages as JSON lines
    Diff { left: PathBuf, right: PathBuf },
    /// Print the blocks extracted from a document
    Blocks { file: PathBuf },
    /// Print the heading outline of a document
    Outline { file: PathBuf },
    /// Print a document's HTML with anchor ids on its headings
    Render { file: PathBuf },
    /// Coordinate views for an external host over JSON lines on stdin/stdout
    Host,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(command) = cli.command {
        logging::init_stderr();
        return match command {
            Commands::Config => config::open_config_in_editor(),
            Commands::Diff { left, right } => block_on(print_diff(left, right)),
            Commands::Blocks { file } => block_on(print_blocks(file)),
            Commands::Outline { file } => block_on(print_outline(file)),
            Commands::Render { file } => block_on(print_rendered(file)),
            Commands::Host => block_on(serve_host()),
        };
    }

    let file = cli
        .file
        .ok_or_else(|| anyhow::anyhow!("No file provided. Try `docpane <file.docx>`."))?;

    let cfg = config::load_config()?;
    if let Some(path) = logging::init_for_tui()? {
        log::debug!("logging to {}", path.display());
    }

    let path = canonical(&file)?;
    let mut requests = vec![app::OpenRequest {
        path: path.clone(),
        source: path.clone(),
    }];
    for other in &cli.against {
        requests.push(app::OpenRequest {
            path: path.clone(),
            source: canonical(other)?,
        });
    }
    app::run_app(requests, cfg)
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to open {}", path.display()))
}

fn block_on<F: std::future::Future<Output = Result<()>>>(future: F) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;
    LocalSet::new().block_on(&runtime, future)
}

async fn render_file(renderer: &FsRenderer, path: &Path) -> Result<String> {
    renderer
        .render_to_markup(path)
        .await
        .with_context(|| format!("Failed to render {}", path.display()))
}

async fn print_diff(left: PathBuf, right: PathBuf) -> Result<()> {
    let cfg = config::load_config()?;
    let left = canonical(&left)?;
    let right = canonical(&right)?;
    let coordinator = Coordinator::new(
        DocumentState::from_config(&cfg),
        FsRenderer::new(cfg.converter.clone()),
        LineHost::new(io::stdout()),
    )
    .with_max_diff_blocks(cfg.max_diff_blocks);
    stdio::diff_once(&coordinator, &left, &right).await
}

async fn serve_host() -> Result<()> {
    let cfg = config::load_config()?;
    let coordinator = Coordinator::new(
        DocumentState::from_config(&cfg),
        FsRenderer::new(cfg.converter.clone()),
        LineHost::new(io::stdout()),
    )
    .with_max_diff_blocks(cfg.max_diff_blocks);
    stdio::serve(Rc::new(coordinator), BufReader::new(tokio::io::stdin())).await
}

async fn print_blocks(file: PathBuf) -> Result<()> {
    let cfg = config::load_config()?;
    let markup = render_file(&FsRenderer::new(cfg.converter), &file).await?;
    for (idx, block) in blocks::extract_blocks(&markup).iter().enumerate() {
        println!("{idx:>4}  {}", block.replace('\n', " "));
    }
    Ok(())
}

async fn print_outline(file: PathBuf) -> Result<()> {
    let cfg = config::load_config()?;
    let markup = render_file(&FsRenderer::new(cfg.converter), &file).await?;
    let outline = outline::extract_outline(&markup);
    if outline.items.is_empty() {
        println!("No headings found");
    }
    for item in outline.items {
        let indent = "  ".repeat(item.level.saturating_sub(1) as usize);
        println!("{indent}{}  #{}", item.text, item.id);
    }
    Ok(())
}

async fn print_rendered(file: PathBuf) -> Result<()> {
    let cfg = config::load_config()?;
    let markup = render_file(&FsRenderer::new(cfg.converter), &file).await?;
    println!("{}", outline::extract_outline(&markup).markup);
    Ok(())
}
