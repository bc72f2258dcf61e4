// Swallows the next outward scroll report after a position arrives from a
// sibling, so positions do not bounce between panes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrollGuard {
    suppress_next: bool,
}

impl ScrollGuard {
    pub fn received(&mut self) {
        self.suppress_next = true;
    }

    pub fn should_report(&mut self) -> bool {
        !std::mem::take(&mut self.suppress_next)
    }
}

// 0 when nothing can scroll.
pub fn fraction_of(offset: usize, max_offset: usize) -> f64 {
    if max_offset == 0 {
        return 0.0;
    }
    (offset.min(max_offset) as f64 / max_offset as f64).clamp(0.0, 1.0)
}

pub fn offset_for(fraction: f64, max_offset: usize) -> usize {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * max_offset as f64).round() as usize
}
