use crate::coordinator::{Coordinator, DiffOutcome};
use crate::host::Host;
use crate::message::Inbound;
use crate::registry::{InstanceId, ViewInstance};
use crate::render::Renderer;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;

// What an external view host reports, one JSON object per line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum Request {
    Open {
        instance: u64,
        path: PathBuf,
        #[serde(default)]
        source: Option<PathBuf>,
    },
    Close {
        instance: u64,
    },
    Changed {
        source: PathBuf,
    },
    Message {
        instance: u64,
        message: Inbound,
    },
}

pub async fn serve<R, H, I>(coordinator: Rc<Coordinator<R, H>>, input: I) -> Result<()>
where
    R: Renderer + 'static,
    H: Host + 'static,
    I: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut passes = JoinSet::new();
    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let request = match serde_json::from_str::<Request>(line) {
            Ok(request) => request,
            Err(err) => {
                log::warn!("ignoring request {line:?}: {err}");
                continue;
            }
        };
        for path in apply(&coordinator, request) {
            let coordinator = Rc::clone(&coordinator);
            passes.spawn_local(async move {
                let outcome = coordinator.maybe_trigger_diff(&path).await;
                log::debug!("diff for {}: {outcome:?}", path.display());
            });
        }
    }
    while passes.join_next().await.is_some() {}
    Ok(())
}

// Compares `right` against `left` as two views of `left`, instances 1 and 2.
pub async fn diff_once<R: Renderer, H: Host>(
    coordinator: &Coordinator<R, H>,
    left: &Path,
    right: &Path,
) -> Result<()> {
    coordinator.open(ViewInstance::new(InstanceId::new(1), left));
    coordinator.open(ViewInstance::with_source(InstanceId::new(2), left, right));
    match coordinator.maybe_trigger_diff(left).await {
        DiffOutcome::Dispatched => Ok(()),
        DiffOutcome::Aborted(reason) => anyhow::bail!("Failed to render: {reason}"),
        DiffOutcome::TooLarge => {
            anyhow::bail!("Documents have too many blocks; raise max_diff_blocks to compare them")
        }
        other => anyhow::bail!("Diff did not complete: {other:?}"),
    }
}

// Returns the logical paths that need a fresh diff pass.
fn apply<R: Renderer, H: Host>(coordinator: &Coordinator<R, H>, request: Request) -> Vec<PathBuf> {
    match request {
        Request::Open {
            instance,
            path,
            source,
        } => {
            let source = source.unwrap_or_else(|| path.clone());
            let instance = ViewInstance::with_source(InstanceId::new(instance), path.clone(), source);
            coordinator.open(instance);
            vec![path]
        }
        Request::Close { instance } => match coordinator.close(InstanceId::new(instance)) {
            Some(closed) if closed.rediff => vec![closed.instance.path],
            Some(_) => Vec::new(),
            None => {
                log::debug!("close for unknown instance {instance}");
                Vec::new()
            }
        },
        Request::Changed { source } => coordinator.stale_diffs(&source),
        Request::Message { instance, message } => {
            coordinator.handle_message(InstanceId::new(instance), message);
            Vec::new()
        }
    }
}
