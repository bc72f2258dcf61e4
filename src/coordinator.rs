use crate::align::{align_bounded, highlights, HighlightSet};
use crate::blocks::extract_blocks;
use crate::host::{Host, Notice};
use crate::message::{Inbound, Outbound};
use crate::registry::{InstanceId, Registry, ViewInstance};
use crate::render::Renderer;
use crate::state::{DocumentState, Theme};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_DIFF_BLOCKS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    NotNeeded,
    Dispatched,
    // Rendering one side failed.
    Aborted(String),
    // The pair or the pass went stale while rendering.
    Discarded,
    TooLarge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed {
    pub instance: ViewInstance,
    pub rediff: bool,
}

// Everything runs on one thread. Registry borrows are released before every
// `.await`, and what was read before a suspension point is re-checked after it.
pub struct Coordinator<R, H> {
    registry: RefCell<Registry>,
    defaults: DocumentState,
    renderer: R,
    host: H,
    generations: RefCell<HashMap<PathBuf, u64>>,
    max_diff_blocks: usize,
}

impl<R: Renderer, H: Host> Coordinator<R, H> {
    pub fn new(defaults: DocumentState, renderer: R, host: H) -> Self {
        Self {
            registry: RefCell::new(Registry::default()),
            defaults,
            renderer,
            host,
            generations: RefCell::new(HashMap::new()),
            max_diff_blocks: DEFAULT_MAX_DIFF_BLOCKS,
        }
    }

    pub fn with_max_diff_blocks(mut self, max: usize) -> Self {
        self.max_diff_blocks = max;
        self
    }

    #[cfg(test)]
    pub fn registry(&self) -> std::cell::Ref<'_, Registry> {
        self.registry.borrow()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[cfg(test)]
    pub fn host(&self) -> &H {
        &self.host
    }

    // Returns the state the instance starts with. Follow with `maybe_trigger_diff`.
    pub fn open(&self, instance: ViewInstance) -> DocumentState {
        log::debug!("open {} for {}", instance.id, instance.path.display());
        let id = instance.id;
        let mut registry = self.registry.borrow_mut();
        registry.register(instance, self.defaults.clone());
        registry
            .get_state(id)
            .cloned()
            .unwrap_or_else(|| self.defaults.clone())
    }

    pub fn close(&self, id: InstanceId) -> Option<Closed> {
        let (instance, was_paired, remaining) = {
            let mut registry = self.registry.borrow_mut();
            let path = registry.path_of(id)?.to_path_buf();
            let was_paired = registry.siblings_of(&path).iter().take(2).any(|s| *s == id);
            let instance = registry.unregister(id)?;
            let remaining = registry.siblings_of(&path).to_vec();
            (instance, was_paired, remaining)
        };
        log::debug!("close {} for {}", id, instance.path.display());

        // Any pass in flight compared a pair that no longer exists.
        if was_paired {
            self.bump_generation(&instance.path);
        }
        if let [only] = remaining.as_slice() {
            self.dispatch_highlight(*only, HighlightSet::default());
        }
        Some(Closed {
            instance,
            rediff: remaining.len() >= 2,
        })
    }

    // Logical paths whose diff pair renders `source`, so a change to that file
    // makes their highlights stale.
    pub fn stale_diffs(&self, source: &Path) -> Vec<PathBuf> {
        let registry = self.registry.borrow();
        let mut paths: Vec<PathBuf> = registry
            .instances()
            .filter(|i| i.source == source)
            .map(|i| i.path.clone())
            .collect();
        paths.sort();
        paths.dedup();
        paths.retain(|path| {
            let pair = registry.siblings_of(path);
            pair.len() >= 2
                && pair[..2]
                    .iter()
                    .any(|id| registry.instance(*id).is_some_and(|i| i.source == source))
        });
        paths
    }

    // Compares the first two instances open on `path`. Later siblings are not
    // part of the comparison.
    pub async fn maybe_trigger_diff(&self, path: &Path) -> DiffOutcome {
        let Some((left, right)) = self.diff_pair(path) else {
            return DiffOutcome::NotNeeded;
        };
        let generation = self.bump_generation(path);
        log::debug!(
            "diff pass {generation} for {}: {} vs {}",
            path.display(),
            left.id,
            right.id
        );

        let (left_markup, right_markup) = tokio::join!(
            self.renderer.render_to_markup(&left.source),
            self.renderer.render_to_markup(&right.source)
        );
        let (left_markup, right_markup) = match (left_markup, right_markup) {
            (Ok(l), Ok(r)) => (l, r),
            (Err(err), _) | (_, Err(err)) => {
                log::warn!("diff for {} aborted: {err}", path.display());
                return DiffOutcome::Aborted(err.to_string());
            }
        };

        let left_blocks = extract_blocks(&left_markup);
        let right_blocks = extract_blocks(&right_markup);
        let Some(script) = align_bounded(&left_blocks, &right_blocks, self.max_diff_blocks) else {
            log::warn!(
                "diff for {} skipped: {} vs {} blocks exceeds limit of {}",
                path.display(),
                left_blocks.len(),
                right_blocks.len(),
                self.max_diff_blocks
            );
            return DiffOutcome::TooLarge;
        };
        debug_assert_eq!(script.left_len(), left_blocks.len());
        debug_assert_eq!(script.right_len(), right_blocks.len());
        if script.is_unchanged() {
            log::debug!("diff pass {generation} for {}: no differences", path.display());
        }
        let (left_marks, right_marks) = highlights(&script);

        if !self.pass_is_current(path, generation, left.id, right.id) {
            log::debug!("diff pass {generation} for {} discarded", path.display());
            return DiffOutcome::Discarded;
        }
        self.dispatch_highlight(left.id, left_marks);
        self.dispatch_highlight(right.id, right_marks);
        DiffOutcome::Dispatched
    }

    // Returns how many views were told.
    pub fn on_scroll(&self, source: InstanceId, fraction: f64) -> usize {
        if !fraction.is_finite() {
            return 0;
        }
        let fraction = fraction.clamp(0.0, 1.0);
        let targets: Vec<InstanceId> = {
            let registry = self.registry.borrow();
            let Some(path) = registry.path_of(source) else {
                return 0;
            };
            registry
                .siblings_of(path)
                .iter()
                .copied()
                .filter(|id| *id != source)
                .collect()
        };
        for id in &targets {
            self.host.post(*id, Outbound::SyncScroll { scroll_percent: fraction });
        }
        targets.len()
    }

    pub fn handle_message(&self, id: InstanceId, message: Inbound) {
        match message {
            Inbound::Scroll { scroll_percent } => {
                self.on_scroll(id, scroll_percent);
            }
            Inbound::ZoomChanged { zoom } => {
                self.update_state(id, |s| s.set_zoom(zoom));
            }
            Inbound::OutlineToggled { visible } => {
                self.update_state(id, |s| s.outline_visible = visible);
            }
            Inbound::ThemeChanged { theme } => {
                self.update_state(id, |s| s.theme = theme);
            }
            Inbound::ToolbarToggled { visible } => {
                self.update_state(id, |s| s.toolbar_visible = visible);
            }
            Inbound::Error { message } => {
                self.host
                    .notify(Notice::Error, &format!("Document Viewer Error: {message}"));
            }
            Inbound::Info { message } => self.host.notify(Notice::Info, &message),
        }
    }

    pub fn zoom_in(&self, id: InstanceId) -> Option<f32> {
        self.zoom_with(id, DocumentState::zoom_in)
    }

    pub fn zoom_out(&self, id: InstanceId) -> Option<f32> {
        self.zoom_with(id, DocumentState::zoom_out)
    }

    pub fn reset_zoom(&self, id: InstanceId) -> Option<f32> {
        self.zoom_with(id, |s| {
            s.reset_zoom();
            true
        })
    }

    pub fn toggle_outline(&self, id: InstanceId) -> Option<bool> {
        let visible = self.update_state(id, DocumentState::toggle_outline)?;
        self.host.post(id, Outbound::ToggleOutline { visible });
        Some(visible)
    }

    pub fn toggle_toolbar(&self, id: InstanceId) -> Option<bool> {
        let visible = self.update_state(id, DocumentState::toggle_toolbar)?;
        self.host.post(id, Outbound::ToggleToolbar { visible });
        Some(visible)
    }

    pub fn cycle_theme(&self, id: InstanceId) -> Option<Theme> {
        let theme = self.update_state(id, DocumentState::cycle_theme)?;
        self.host.post(id, Outbound::UpdateTheme { theme });
        Some(theme)
    }

    #[cfg(test)]
    pub fn state_of(&self, id: InstanceId) -> Option<DocumentState> {
        self.registry.borrow().get_state(id).cloned()
    }

    // Posts only when the step changed something.
    fn zoom_with(&self, id: InstanceId, step: impl FnOnce(&mut DocumentState) -> bool) -> Option<f32> {
        let (changed, zoom) = self.update_state(id, |s| (step(s), s.zoom()))?;
        if changed {
            self.host.post(id, Outbound::UpdateZoom { zoom });
        }
        Some(zoom)
    }

    fn update_state<T>(&self, id: InstanceId, f: impl FnOnce(&mut DocumentState) -> T) -> Option<T> {
        let mut registry = self.registry.borrow_mut();
        match registry.ensure_state(id, &self.defaults) {
            Some(state) => Some(f(state)),
            None => {
                log::debug!("ignoring update for unknown instance {id}");
                None
            }
        }
    }

    fn diff_pair(&self, path: &Path) -> Option<(ViewInstance, ViewInstance)> {
        let registry = self.registry.borrow();
        match registry.siblings_of(path) {
            [first, second, ..] => Some((
                registry.instance(*first)?.clone(),
                registry.instance(*second)?.clone(),
            )),
            _ => None,
        }
    }

    fn bump_generation(&self, path: &Path) -> u64 {
        let mut generations = self.generations.borrow_mut();
        let generation = generations.entry(path.to_path_buf()).or_insert(0);
        *generation += 1;
        *generation
    }

    fn pass_is_current(&self, path: &Path, generation: u64, left: InstanceId, right: InstanceId) -> bool {
        if self.generations.borrow().get(path) != Some(&generation) {
            return false;
        }
        matches!(
            self.registry.borrow().siblings_of(path),
            [first, second, ..] if *first == left && *second == right
        )
    }

    fn dispatch_highlight(&self, id: InstanceId, diffs: HighlightSet) {
        if self.registry.borrow().get_state(id).is_none() {
            log::warn!("dropping highlight for unregistered instance {id}");
            return;
        }
        self.host.post(id, Outbound::Highlight { diffs });
    }
}
