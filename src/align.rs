use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Unchanged,
    Added,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub kind: RunKind,
    pub count: usize,
}

impl Run {
    pub fn new(kind: RunKind, count: usize) -> Self {
        Self { kind, count }
    }
}

// Adjacent runs never share a kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    pub runs: Vec<Run>,
}

impl EditScript {
    pub fn left_len(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| r.kind != RunKind::Added)
            .map(|r| r.count)
            .sum()
    }

    pub fn right_len(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| r.kind != RunKind::Removed)
            .map(|r| r.count)
            .sum()
    }

    pub fn is_unchanged(&self) -> bool {
        self.runs.iter().all(|r| r.kind == RunKind::Unchanged)
    }

    fn push(&mut self, kind: RunKind) {
        match self.runs.last_mut() {
            Some(last) if last.kind == kind => last.count += 1,
            _ => self.runs.push(Run::new(kind, 1)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighlightSet {
    pub added: BTreeSet<usize>,
    pub removed: BTreeSet<usize>,
}

impl HighlightSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

// On a backtracking tie the element of `b` is consumed first, so ambiguous
// stretches read as removals before additions once the trace is reversed.
pub fn align<T: PartialEq>(a: &[T], b: &[T]) -> EditScript {
    let n = a.len();
    let m = b.len();
    let width = m + 1;
    let mut table = vec![0usize; (n + 1) * width];

    for i in 1..=n {
        for j in 1..=m {
            table[i * width + j] = if a[i - 1] == b[j - 1] {
                table[(i - 1) * width + (j - 1)] + 1
            } else {
                table[(i - 1) * width + j].max(table[i * width + (j - 1)])
            };
        }
    }

    let mut trace = Vec::with_capacity(n + m);
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] {
            trace.push(RunKind::Unchanged);
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || table[i * width + (j - 1)] >= table[(i - 1) * width + j]) {
            trace.push(RunKind::Added);
            j -= 1;
        } else {
            trace.push(RunKind::Removed);
            i -= 1;
        }
    }

    let mut script = EditScript::default();
    for kind in trace.into_iter().rev() {
        script.push(kind);
    }
    script
}

pub fn align_bounded<T: PartialEq>(a: &[T], b: &[T], max_len: usize) -> Option<EditScript> {
    if a.len() > max_len || b.len() > max_len {
        return None;
    }
    Some(align(a, b))
}

pub fn highlights(script: &EditScript) -> (HighlightSet, HighlightSet) {
    let mut left = HighlightSet::default();
    let mut right = HighlightSet::default();
    let (mut li, mut ri) = (0usize, 0usize);

    for run in &script.runs {
        match run.kind {
            RunKind::Unchanged => {
                li += run.count;
                ri += run.count;
            }
            RunKind::Removed => {
                left.removed.extend(li..li + run.count);
                li += run.count;
            }
            RunKind::Added => {
                right.added.extend(ri..ri + run.count);
                ri += run.count;
            }
        }
    }

    (left, right)
}
