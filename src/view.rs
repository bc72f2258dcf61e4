use crate::align::HighlightSet;
use crate::blocks::{extract_tagged_blocks, Block, BlockKind};
use crate::message::Outbound;
use crate::outline::{current_heading_index, extract_outline, OutlineItem};
use crate::registry::InstanceId;
use crate::search::{self, Match, Query};
use crate::state::DocumentState;
use crate::sync::{fraction_of, offset_for, ScrollGuard};
use crate::theme::UiPalette;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use std::path::PathBuf;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

// Layout width that disables wrapping and centering.
pub const NO_WRAP: u16 = u16::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    None,
    Added,
    Removed,
}

pub struct Pane {
    pub id: InstanceId,
    pub path: PathBuf,
    pub source: PathBuf,
    pub state: DocumentState,
    blocks: Vec<Block>,
    outline: Vec<OutlineItem>,
    heading_blocks: Vec<usize>,
    highlights: HighlightSet,
    error: Option<String>,
    scroll: usize,
    last_reported: usize,
    pending_fraction: Option<f64>,
    guard: ScrollGuard,
    lines: Vec<Line<'static>>,
    block_starts: Vec<usize>,
    layout_width: Option<u16>,
    query: Option<Query>,
    matches: Vec<Match>,
    current_match: usize,
    reveal_match: bool,
}

impl Pane {
    pub fn new(id: InstanceId, path: PathBuf, source: PathBuf, state: DocumentState) -> Self {
        Self {
            id,
            path,
            source,
            state,
            blocks: Vec::new(),
            outline: Vec::new(),
            heading_blocks: Vec::new(),
            highlights: HighlightSet::default(),
            error: None,
            scroll: 0,
            last_reported: 0,
            pending_fraction: None,
            guard: ScrollGuard::default(),
            lines: Vec::new(),
            block_starts: Vec::new(),
            layout_width: None,
            query: None,
            matches: Vec::new(),
            current_match: 0,
            reveal_match: false,
        }
    }

    pub fn set_markup(&mut self, markup: &str) {
        self.blocks = extract_tagged_blocks(markup);
        self.outline = extract_outline(markup).items;
        self.heading_blocks = locate_headings(&self.outline, &self.blocks);
        self.error = None;
        self.invalidate();
    }

    // Shown instead of content, so a broken document never looks like one
    // without differences.
    pub fn set_error(&mut self, message: String) {
        self.blocks.clear();
        self.outline.clear();
        self.heading_blocks.clear();
        self.highlights = HighlightSet::default();
        self.error = Some(message);
        self.invalidate();
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn outline(&self) -> &[OutlineItem] {
        &self.outline
    }

    pub fn highlights(&self) -> &HighlightSet {
        &self.highlights
    }

    pub fn apply(&mut self, message: Outbound) {
        match message {
            Outbound::Highlight { diffs } => {
                self.highlights = diffs;
                self.invalidate();
            }
            Outbound::SyncScroll { scroll_percent } => {
                self.pending_fraction = Some(scroll_percent);
            }
            Outbound::UpdateZoom { zoom } => {
                self.state.set_zoom(zoom);
                self.invalidate();
            }
            Outbound::ToggleOutline { visible } => self.state.outline_visible = visible,
            Outbound::UpdateTheme { theme } => {
                self.state.theme = theme;
                self.invalidate();
            }
            Outbound::ToggleToolbar { visible } => self.state.toolbar_visible = visible,
        }
    }

    pub fn mark(&self, block: usize) -> Mark {
        if self.highlights.added.contains(&block) {
            Mark::Added
        } else if self.highlights.removed.contains(&block) {
            Mark::Removed
        } else {
            Mark::None
        }
    }

    pub fn palette(&self) -> UiPalette {
        UiPalette::for_theme(self.state.theme)
    }

    pub fn prepare(&mut self, width: u16, height: u16) {
        if self.layout_width != Some(width) {
            self.relayout(width);
        }
        if std::mem::take(&mut self.reveal_match) {
            if let Some(m) = self.matches.get(self.current_match) {
                self.scroll = m.line;
                self.pending_fraction = None;
            }
        }
        if let Some(fraction) = self.pending_fraction.take() {
            let target = offset_for(fraction, self.max_scroll(height));
            if target != self.scroll {
                self.scroll = target;
                self.guard.received();
            }
        }
        self.scroll = self.scroll.min(self.max_scroll(height));
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn max_scroll(&self, height: u16) -> usize {
        self.lines.len().saturating_sub(height as usize)
    }

    pub fn scroll_by(&mut self, delta: isize, height: u16) {
        let max = self.max_scroll(height);
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self, height: u16) {
        self.scroll = self.max_scroll(height);
    }

    // Only moves since the last call that no sibling caused are reported.
    pub fn take_scroll_report(&mut self, height: u16) -> Option<f64> {
        if self.scroll == self.last_reported {
            return None;
        }
        self.last_reported = self.scroll;
        if !self.guard.should_report() {
            return None;
        }
        Some(fraction_of(self.scroll, self.max_scroll(height)))
    }

    pub fn current_block(&self) -> usize {
        match self.block_starts.binary_search(&self.scroll) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    pub fn current_heading(&self) -> Option<usize> {
        if self.heading_blocks.is_empty() {
            return None;
        }
        Some(current_heading_index(self.current_block(), &self.heading_blocks))
    }

    pub fn jump_to_heading(&mut self, heading: usize) {
        if let Some(start) = self
            .heading_blocks
            .get(heading)
            .and_then(|block| self.block_starts.get(*block))
        {
            self.scroll = *start;
        }
    }

    pub fn next_heading(&mut self) {
        let current_block = self.current_block();
        if let Some(idx) = self.heading_blocks.iter().position(|b| *b > current_block) {
            self.jump_to_heading(idx);
        }
    }

    pub fn prev_heading(&mut self) {
        let on_start = self.block_starts.get(self.current_block()) == Some(&self.scroll);
        let current_block = self.current_block();
        let target = self
            .heading_blocks
            .iter()
            .rposition(|b| *b < current_block || (*b == current_block && !on_start));
        if let Some(idx) = target {
            self.jump_to_heading(idx);
        }
    }

    pub fn mark_starts(&self) -> Vec<usize> {
        self.block_starts
            .iter()
            .enumerate()
            .filter(|(block, _)| self.mark(*block) != Mark::None)
            .map(|(_, start)| *start)
            .collect()
    }

    pub fn next_change(&mut self) {
        let scroll = self.scroll;
        if let Some(start) = self.mark_starts().into_iter().find(|s| *s > scroll) {
            self.scroll = start;
        }
    }

    pub fn prev_change(&mut self) {
        let scroll = self.scroll;
        if let Some(start) = self.mark_starts().into_iter().rev().find(|s| *s < scroll) {
            self.scroll = start;
        }
    }

    // Returns the number of hits, counted on the current layout.
    pub fn set_search(&mut self, text: &str, case_sensitive: bool) -> Option<usize> {
        let query = Query::new(text, case_sensitive)?;
        self.query = Some(query);
        self.current_match = 0;
        self.reveal_match = true;
        self.refresh();
        Some(self.matches.len())
    }

    pub fn clear_search(&mut self) {
        if self.query.take().is_some() {
            self.matches.clear();
            self.current_match = 0;
            self.refresh();
        }
    }

    pub fn search_query(&self) -> Option<&str> {
        self.query.as_ref().map(Query::as_str)
    }

    // (current, total), one-based.
    pub fn search_status(&self) -> Option<(usize, usize)> {
        self.query.as_ref()?;
        let total = self.matches.len();
        let current = if total == 0 { 0 } else { self.current_match + 1 };
        Some((current, total))
    }

    pub fn next_match(&mut self) {
        self.jump_match(1);
    }

    pub fn prev_match(&mut self) {
        self.jump_match(-1);
    }

    fn jump_match(&mut self, delta: isize) {
        if self.matches.is_empty() {
            return;
        }
        self.current_match = search::step(self.current_match, delta, self.matches.len());
        self.reveal_match = true;
        self.refresh();
    }

    fn invalidate(&mut self) {
        self.layout_width = None;
    }

    fn refresh(&mut self) {
        match self.layout_width {
            Some(width) => self.relayout(width),
            None => self.invalidate(),
        }
    }

    fn relayout(&mut self, width: u16) {
        self.layout_width = Some(width);
        let palette = self.palette();
        let (column, margin) = if width == NO_WRAP {
            (usize::MAX, String::new())
        } else {
            let column = text_column(width, self.state.zoom());
            (column, " ".repeat((width as usize).saturating_sub(column) / 2))
        };

        self.lines.clear();
        self.block_starts.clear();
        self.matches.clear();

        if let Some(error) = &self.error {
            for line in wrap_text(error, column) {
                self.lines.push(Line::from(format!("{margin}{line}")));
            }
            return;
        }

        for (idx, block) in self.blocks.iter().enumerate() {
            self.block_starts.push(self.lines.len());
            let (prefix, mut style) = match block.kind {
                BlockKind::Heading(level) => ("", palette.heading_style(level)),
                BlockKind::ListItem => ("• ", palette.base_style()),
                BlockKind::Quote => ("│ ", palette.base_style().fg(palette.muted)),
                BlockKind::Paragraph | BlockKind::Division => ("", palette.base_style()),
            };
            let gutter = match self.mark(idx) {
                Mark::Added => {
                    style = style.bg(palette.added_bg);
                    "+ "
                }
                Mark::Removed => {
                    style = style.bg(palette.removed_bg);
                    "- "
                }
                Mark::None => "  ",
            };
            let indent = " ".repeat(UnicodeWidthStr::width(prefix));
            let body_width = column.saturating_sub(2 + indent.len()).max(1);
            let wrapped = wrap_text(&block.text, body_width);
            for (n, text) in wrapped.into_iter().enumerate() {
                let lead = if n == 0 { prefix } else { indent.as_str() };
                let mut spans = vec![
                    Span::raw(margin.clone()),
                    Span::styled(gutter, style),
                    Span::styled(lead.to_string(), style),
                ];
                let first = self.matches.len();
                if let Some(query) = &self.query {
                    let line = self.lines.len();
                    self.matches.extend(query.ranges_in(&text).into_iter().map(|r| Match {
                        line,
                        start: r.start,
                        end: r.end,
                    }));
                }
                let current = self.current_match.checked_sub(first);
                spans.extend(hit_spans(text, &self.matches[first..], current, style, &palette));
                self.lines.push(Line::from(spans));
            }
            self.lines.push(Line::from(""));
        }
        if self.current_match >= self.matches.len() {
            self.current_match = 0;
        }
    }
}

// Splits one wrapped line around its search hits. `current` indexes `hits`.
fn hit_spans(
    text: String,
    hits: &[Match],
    current: Option<usize>,
    style: Style,
    palette: &UiPalette,
) -> Vec<Span<'static>> {
    if hits.is_empty() {
        return vec![Span::styled(text, style)];
    }
    let mut spans = Vec::new();
    let mut cursor = 0;
    for (idx, m) in hits.iter().enumerate() {
        if m.start > cursor {
            spans.push(Span::styled(text[cursor..m.start].to_string(), style));
        }
        let bg = if current == Some(idx) {
            palette.search_current_bg
        } else {
            palette.search_bg
        };
        spans.push(Span::styled(text[m.start..m.end].to_string(), style.bg(bg)));
        cursor = m.end;
    }
    if cursor < text.len() {
        spans.push(Span::styled(text[cursor..].to_string(), style));
    }
    spans
}

// Higher zoom means fewer characters per line, like larger type.
fn text_column(width: u16, zoom: f32) -> usize {
    let width = width as usize;
    let scaled = (width as f32 / zoom.max(1.0)).floor() as usize;
    scaled.clamp(width.min(20), width.max(1))
}

// Pairs each outline entry with the first unused heading block carrying the
// same text. Entries with no such block share the previous entry's target.
fn locate_headings(outline: &[OutlineItem], blocks: &[Block]) -> Vec<usize> {
    let mut out = Vec::with_capacity(outline.len());
    let mut cursor = 0;
    for item in outline {
        let found = blocks[cursor.min(blocks.len())..]
            .iter()
            .position(|b| matches!(b.kind, BlockKind::Heading(_)) && b.text == item.text)
            .map(|offset| cursor + offset);
        match found {
            Some(block) => {
                out.push(block);
                cursor = block + 1;
            }
            None => out.push(out.last().copied().unwrap_or(0)),
        }
    }
    out
}

// Greedy word wrap on display width. Words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();
    for source_line in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0usize;
        for word in source_line.split_whitespace() {
            let word_width = UnicodeWidthStr::width(word);
            let gap = usize::from(!current.is_empty());
            if current_width + gap + word_width <= width {
                if gap == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += gap + word_width;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if word_width <= width {
                current.push_str(word);
                current_width = word_width;
                continue;
            }
            for ch in word.chars() {
                let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
                if current_width + ch_width > width && !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(ch);
                current_width += ch_width;
            }
        }
        out.push(current);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{text_column, wrap_text, Mark, Pane};
    use crate::align::HighlightSet;
    use crate::message::Outbound;
    use crate::registry::InstanceId;
    use crate::state::DocumentState;
    use ratatui::style::Color;
    use std::path::PathBuf;

    fn pane(markup: &str) -> Pane {
        let mut pane = Pane::new(
            InstanceId::new(1),
            PathBuf::from("/doc.md"),
            PathBuf::from("/doc.md"),
            DocumentState::default(),
        );
        pane.set_markup(markup);
        pane
    }

    fn line_text(pane: &Pane, idx: usize) -> String {
        pane.lines()[idx]
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect()
    }

    #[test]
    fn wrap_breaks_on_words_and_splits_long_ones() {
        assert_eq!(wrap_text("aa bb cc", 5), vec!["aa bb", "cc"]);
        assert_eq!(wrap_text("abcdefg", 3), vec!["abc", "def", "g"]);
        assert_eq!(wrap_text("", 10), vec![""]);
        assert_eq!(wrap_text("one\ntwo", 10), vec!["one", "two"]);
    }

    #[test]
    fn zoom_narrows_the_text_column() {
        assert_eq!(text_column(100, 1.0), 100);
        assert_eq!(text_column(100, 0.5), 100);
        assert_eq!(text_column(100, 2.0), 50);
        assert_eq!(text_column(30, 3.0), 20);
        assert_eq!(text_column(10, 3.0), 10);
    }

    #[test]
    fn highlights_replace_previous_set() {
        let mut pane = pane("<p>a</p><p>b</p><p>c</p>");
        let mut first = HighlightSet::default();
        first.added.insert(0);
        first.removed.insert(2);
        pane.apply(Outbound::Highlight { diffs: first });
        assert_eq!(pane.mark(0), Mark::Added);
        assert_eq!(pane.mark(2), Mark::Removed);

        let mut second = HighlightSet::default();
        second.added.insert(1);
        pane.apply(Outbound::Highlight { diffs: second });
        assert_eq!(pane.mark(0), Mark::None);
        assert_eq!(pane.mark(1), Mark::Added);
        assert_eq!(pane.mark(2), Mark::None);
    }

    #[test]
    fn marked_blocks_get_a_gutter_sign() {
        let mut pane = pane("<p>a</p><p>b</p>");
        let mut diffs = HighlightSet::default();
        diffs.removed.insert(1);
        pane.apply(Outbound::Highlight { diffs });
        pane.prepare(40, 10);
        assert_eq!(line_text(&pane, 0), "  a");
        assert_eq!(line_text(&pane, 2), "- b");
    }

    #[test]
    fn remote_scroll_is_not_echoed() {
        let markup = "<p>x</p>".repeat(30);
        let mut pane = pane(&markup);
        pane.prepare(40, 10);
        assert_eq!(pane.max_scroll(10), 50);

        pane.apply(Outbound::SyncScroll { scroll_percent: 0.5 });
        pane.prepare(40, 10);
        assert_eq!(pane.scroll(), 25);
        assert_eq!(pane.take_scroll_report(10), None);

        pane.scroll_by(5, 10);
        assert_eq!(pane.take_scroll_report(10), Some(0.6));
        assert_eq!(pane.take_scroll_report(10), None);
    }

    #[test]
    fn remote_scroll_to_same_spot_does_not_arm_guard() {
        let markup = "<p>x</p>".repeat(30);
        let mut pane = pane(&markup);
        pane.prepare(40, 10);
        pane.apply(Outbound::SyncScroll { scroll_percent: 0.0 });
        pane.prepare(40, 10);
        pane.scroll_by(10, 10);
        assert_eq!(pane.take_scroll_report(10), Some(0.2));
    }

    #[test]
    fn heading_navigation_follows_outline() {
        let mut pane = pane("<h1>One</h1><p>a</p><p>b</p><h2>Two</h2><p>c</p><h2>Three</h2>");
        pane.prepare(40, 2);
        assert_eq!(pane.outline().len(), 3);
        assert_eq!(pane.current_heading(), Some(0));

        pane.next_heading();
        assert_eq!(pane.current_block(), 3);
        assert_eq!(pane.current_heading(), Some(1));
        pane.next_heading();
        assert_eq!(pane.current_block(), 5);
        pane.prev_heading();
        assert_eq!(pane.current_block(), 3);
    }

    #[test]
    fn change_navigation_visits_marked_blocks() {
        let mut pane = pane("<p>a</p><p>b</p><p>c</p><p>d</p>");
        let mut diffs = HighlightSet::default();
        diffs.added.insert(1);
        diffs.added.insert(3);
        pane.apply(Outbound::Highlight { diffs });
        pane.prepare(40, 2);
        pane.next_change();
        assert_eq!(pane.current_block(), 1);
        pane.next_change();
        assert_eq!(pane.current_block(), 3);
        pane.prev_change();
        assert_eq!(pane.current_block(), 1);
    }

    #[test]
    fn errors_replace_content() {
        let mut pane = pane("<p>a</p>");
        pane.set_error("File not found: /doc.md".to_string());
        pane.prepare(40, 10);
        assert!(pane.blocks().is_empty());
        assert_eq!(pane.error(), Some("File not found: /doc.md"));
        assert!(line_text(&pane, 0).contains("File not found"));
    }

    fn search_hits(pane: &Pane) -> Vec<(usize, String, Color)> {
        let palette = pane.palette();
        let mut out = Vec::new();
        for (idx, line) in pane.lines().iter().enumerate() {
            for span in &line.spans {
                match span.style.bg {
                    Some(bg) if bg == palette.search_bg || bg == palette.search_current_bg => {
                        out.push((idx, span.content.to_string(), bg));
                    }
                    _ => {}
                }
            }
        }
        out
    }

    #[test]
    fn search_highlights_every_hit() {
        let mut pane = pane("<h1>Diff notes</h1><p>no hit</p><p>diff and DIFF</p>");
        pane.prepare(40, 2);
        assert_eq!(pane.set_search("diff", false), Some(3));
        assert_eq!(pane.search_status(), Some((1, 3)));
        assert_eq!(line_text(&pane, 4), "  diff and DIFF");

        let palette = pane.palette();
        assert_eq!(
            search_hits(&pane),
            vec![
                (0, "Diff".to_string(), palette.search_current_bg),
                (4, "diff".to_string(), palette.search_bg),
                (4, "DIFF".to_string(), palette.search_bg),
            ]
        );
    }

    #[test]
    fn match_navigation_wraps_and_scrolls() {
        let mut pane = pane("<h1>Diff notes</h1><p>no hit</p><p>diff and DIFF</p>");
        pane.prepare(40, 2);
        pane.scroll_by(3, 2);
        pane.set_search("diff", false);
        pane.prepare(40, 2);
        assert_eq!(pane.scroll(), 0);

        pane.next_match();
        pane.prepare(40, 2);
        assert_eq!(pane.scroll(), 4);
        assert_eq!(pane.search_status(), Some((2, 3)));
        assert_eq!(search_hits(&pane)[1].2, pane.palette().search_current_bg);

        pane.next_match();
        pane.next_match();
        assert_eq!(pane.search_status(), Some((1, 3)));
        pane.prev_match();
        assert_eq!(pane.search_status(), Some((3, 3)));
    }

    #[test]
    fn case_sensitive_search() {
        let mut pane = pane("<p>diff and DIFF</p>");
        pane.prepare(40, 10);
        assert_eq!(pane.set_search("DIFF", true), Some(1));
        assert_eq!(search_hits(&pane)[0].1, "DIFF");
    }

    #[test]
    fn short_or_cleared_search_highlights_nothing() {
        let mut pane = pane("<p>abc</p>");
        pane.prepare(40, 10);
        assert_eq!(pane.set_search("a", false), None);
        assert_eq!(pane.search_status(), None);

        assert_eq!(pane.set_search("zz", false), Some(0));
        assert_eq!(pane.search_status(), Some((0, 0)));
        pane.next_match();
        assert_eq!(pane.search_status(), Some((0, 0)));

        pane.set_search("bc", false);
        pane.clear_search();
        pane.prepare(40, 10);
        assert_eq!(pane.search_status(), None);
        assert!(search_hits(&pane).is_empty());
        assert_eq!(line_text(&pane, 0), "  abc");
    }

    #[test]
    fn search_follows_new_markup() {
        let mut pane = pane("<p>alpha</p>");
        pane.prepare(40, 10);
        assert_eq!(pane.set_search("beta", false), Some(0));
        pane.set_markup("<p>beta</p><p>beta again</p>");
        pane.prepare(40, 10);
        assert_eq!(pane.search_status(), Some((1, 2)));
    }
}
