use crate::state::DocumentState;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewInstance {
    pub id: InstanceId,
    pub path: PathBuf,
    // Differs from `path` when the instance shows another revision.
    pub source: PathBuf,
}

impl ViewInstance {
    pub fn new(id: InstanceId, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id,
            source: path.clone(),
            path,
        }
    }

    pub fn with_source(id: InstanceId, path: impl Into<PathBuf>, source: impl Into<PathBuf>) -> Self {
        Self {
            id,
            path: path.into(),
            source: source.into(),
        }
    }
}

// The identity map is the source of truth. The path index and the state store
// are derived from it and change inside the same call.
#[derive(Debug, Default)]
pub struct Registry {
    instances: HashMap<InstanceId, ViewInstance>,
    by_path: HashMap<PathBuf, Vec<InstanceId>>,
    states: HashMap<InstanceId, DocumentState>,
}

impl Registry {
    // Re-registering a live identity drops its old entry first, so it moves to
    // the end of its sibling list.
    pub fn register(&mut self, instance: ViewInstance, state: DocumentState) {
        if self.instances.contains_key(&instance.id) {
            log::warn!("instance {} registered twice; replacing", instance.id);
            self.unregister(instance.id);
        }
        let id = instance.id;
        self.by_path.entry(instance.path.clone()).or_default().push(id);
        self.states.insert(id, state);
        self.instances.insert(id, instance);
    }

    pub fn unregister(&mut self, id: InstanceId) -> Option<ViewInstance> {
        let instance = self.instances.remove(&id)?;
        self.states.remove(&id);
        if let Some(siblings) = self.by_path.get_mut(&instance.path) {
            siblings.retain(|other| *other != id);
            if siblings.is_empty() {
                self.by_path.remove(&instance.path);
            }
        }
        Some(instance)
    }

    pub fn siblings_of(&self, path: &Path) -> &[InstanceId] {
        self.by_path.get(path).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn path_of(&self, id: InstanceId) -> Option<&Path> {
        self.instances.get(&id).map(|i| i.path.as_path())
    }

    pub fn instance(&self, id: InstanceId) -> Option<&ViewInstance> {
        self.instances.get(&id)
    }

    pub fn instances(&self) -> impl Iterator<Item = &ViewInstance> {
        self.instances.values()
    }

    pub fn get_state(&self, id: InstanceId) -> Option<&DocumentState> {
        self.states.get(&id)
    }

    // Unregistered identities never get state.
    pub fn ensure_state(&mut self, id: InstanceId, defaults: &DocumentState) -> Option<&mut DocumentState> {
        if !self.instances.contains_key(&id) {
            return None;
        }
        Some(self.states.entry(id).or_insert_with(|| defaults.clone()))
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        for (id, instance) in &self.instances {
            assert_eq!(*id, instance.id);
            let siblings = self.by_path.get(&instance.path).expect("path index entry");
            assert_eq!(siblings.iter().filter(|s| *s == id).count(), 1);
            assert!(self.states.contains_key(id), "state for {id}");
        }
        for (path, siblings) in &self.by_path {
            assert!(!siblings.is_empty());
            for id in siblings {
                assert_eq!(self.path_of(*id), Some(path.as_path()));
            }
        }
        assert_eq!(self.states.len(), self.instances.len());
    }
}

#[cfg(test)]
mod tests {
    use super::{InstanceId, Registry, ViewInstance};
    use crate::state::{DocumentState, Theme};
    use proptest::prelude::*;
    use std::path::Path;

    fn id(n: u64) -> InstanceId {
        InstanceId::new(n)
    }

    fn add(reg: &mut Registry, n: u64, path: &str) {
        reg.register(ViewInstance::new(id(n), path), DocumentState::default());
    }

    fn state(reg: &mut Registry, n: u64) -> &mut DocumentState {
        reg.ensure_state(id(n), &DocumentState::default()).unwrap()
    }

    #[test]
    fn siblings_keep_open_order() {
        let mut reg = Registry::default();
        add(&mut reg, 3, "/doc.docx");
        add(&mut reg, 1, "/doc.docx");
        add(&mut reg, 2, "/other.odt");
        add(&mut reg, 7, "/doc.docx");

        assert_eq!(reg.siblings_of(Path::new("/doc.docx")), &[id(3), id(1), id(7)]);
        assert_eq!(reg.siblings_of(Path::new("/other.odt")), &[id(2)]);
        assert!(reg.siblings_of(Path::new("/missing")).is_empty());
        assert_eq!(reg.path_of(id(1)), Some(Path::new("/doc.docx")));
        reg.assert_consistent();
    }

    #[test]
    fn unregister_clears_every_index() {
        let mut reg = Registry::default();
        add(&mut reg, 1, "/a");
        add(&mut reg, 2, "/a");

        let removed = reg.unregister(id(1)).unwrap();
        assert_eq!(removed.path, Path::new("/a"));
        assert_eq!(reg.path_of(id(1)), None);
        assert!(reg.get_state(id(1)).is_none());
        assert_eq!(reg.siblings_of(Path::new("/a")), &[id(2)]);
        reg.assert_consistent();

        reg.unregister(id(2));
        assert_eq!(reg.instances().count(), 0);
        assert!(reg.unregister(id(2)).is_none());
        reg.assert_consistent();
    }

    #[test]
    fn states_are_not_shared_between_siblings() {
        let mut reg = Registry::default();
        add(&mut reg, 1, "/a");
        add(&mut reg, 2, "/a");

        state(&mut reg, 1).set_zoom(2.0);
        state(&mut reg, 2).theme = Theme::Dark;

        assert_eq!(reg.get_state(id(1)).unwrap().zoom(), 2.0);
        assert_eq!(reg.get_state(id(1)).unwrap().theme, Theme::Auto);
        assert_eq!(reg.get_state(id(2)).unwrap().zoom(), 1.0);
    }

    #[test]
    fn ensure_state_only_for_registered() {
        let mut reg = Registry::default();
        let seed = DocumentState::default();
        assert!(reg.ensure_state(id(1), &seed).is_none());
        add(&mut reg, 1, "/a");
        state(&mut reg, 1).outline_visible = false;
        assert!(!reg.ensure_state(id(1), &seed).unwrap().outline_visible);
    }

    #[test]
    fn registration_keeps_given_state() {
        let mut seed = DocumentState::default();
        seed.theme = Theme::Light;
        let mut reg = Registry::default();
        reg.register(ViewInstance::new(id(1), "/a"), seed);
        assert_eq!(reg.get_state(id(1)).unwrap().theme, Theme::Light);
    }

    #[test]
    fn re_registering_moves_instance() {
        let mut reg = Registry::default();
        add(&mut reg, 1, "/a");
        add(&mut reg, 2, "/a");
        reg.register(ViewInstance::with_source(id(1), "/b", "/b.old"), DocumentState::default());
        assert_eq!(reg.siblings_of(Path::new("/a")), &[id(2)]);
        assert_eq!(reg.instance(id(1)).unwrap().source, Path::new("/b.old"));
        reg.assert_consistent();
    }

    #[derive(Debug, Clone)]
    enum Op {
        Register(u64, usize),
        Unregister(u64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u64..12, 0usize..3).prop_map(|(n, path)| Op::Register(n, path)),
            (0u64..12).prop_map(Op::Unregister),
        ]
    }

    proptest! {
        #[test]
        fn any_call_sequence_stays_consistent(ops in proptest::collection::vec(op_strategy(), 0..200)) {
            let paths = ["/a", "/b", "/c"];
            let mut reg = Registry::default();
            for op in ops {
                match op {
                    Op::Register(n, path) => add(&mut reg, n, paths[path]),
                    Op::Unregister(n) => {
                        reg.unregister(id(n));
                        prop_assert!(reg.path_of(id(n)).is_none());
                        prop_assert!(reg.get_state(id(n)).is_none());
                    }
                }
                reg.assert_consistent();
            }
        }
    }
}
