use crate::blocks::strip_tags;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

const MAX_ID_LEN: usize = 50;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(h[1-6])(?:\s[^>]*)?>(.*?)</h[1-6]\s*>").expect("heading pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub level: u8,
    pub text: String,
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct Outline {
    // Every heading in `items` carries its id here.
    pub markup: String,
    pub items: Vec<OutlineItem>,
}

pub fn extract_outline(markup: &str) -> Outline {
    let mut items = Vec::new();
    let mut used = HashSet::new();

    let rewritten = HEADING_RE.replace_all(markup, |caps: &Captures| {
        let tag = &caps[1];
        let content = &caps[2];
        let text = strip_tags(content);
        if text.is_empty() {
            return caps[0].to_string();
        }
        let level = tag[1..].parse::<u8>().unwrap_or(1);
        let id = unique_id(&text, &mut used);
        let out = format!(r#"<{tag} id="{id}">{content}</{tag}>"#);
        items.push(OutlineItem { level, text, id });
        out
    });

    Outline {
        markup: rewritten.into_owned(),
        items,
    }
}

pub fn heading_id(text: &str) -> String {
    let mut id = String::new();
    let mut pending_dash = false;
    for ch in text.to_lowercase().chars() {
        if ch.is_whitespace() {
            pending_dash = true;
            continue;
        }
        if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
            continue;
        }
        if pending_dash {
            id.push('-');
            pending_dash = false;
        }
        id.push(ch);
    }
    if pending_dash {
        id.push('-');
    }
    id.chars().take(MAX_ID_LEN).collect()
}

fn unique_id(text: &str, used: &mut HashSet<String>) -> String {
    let base = heading_id(text);
    if used.insert(base.clone()) {
        return base;
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{base}-{counter}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

// `heading_blocks` holds the block index of every heading, in order.
pub fn current_heading_index(block: usize, heading_blocks: &[usize]) -> usize {
    let mut idx = 0;
    for (i, start) in heading_blocks.iter().enumerate() {
        if *start <= block {
            idx = i;
        } else {
            break;
        }
    }
    idx
}
