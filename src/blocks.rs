use regex::{Captures, Regex};
use std::sync::LazyLock;

// Order matters only for the capture-group numbering in `BLOCK_RE`.
const BLOCK_TAGS: [&str; 10] = [
    "p",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "li",
    "div",
    "blockquote",
];

// One alternative per tag so that each element is closed by its own end tag.
// The lazy body stops at the first matching close tag, so an outer element
// swallows anything nested inside it.
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives: Vec<String> = BLOCK_TAGS
        .iter()
        .map(|tag| format!(r"<{tag}(?:\s[^>]*)?>(.*?)</{tag}\s*>"))
        .collect();
    Regex::new(&format!("(?is){}", alternatives.join("|"))).expect("block pattern is valid")
});

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern is valid"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("entity pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
    ListItem,
    Division,
    Quote,
}

impl BlockKind {
    fn from_group(group: usize) -> Self {
        match BLOCK_TAGS.get(group) {
            Some(&"p") => BlockKind::Paragraph,
            Some(&"li") => BlockKind::ListItem,
            Some(&"div") => BlockKind::Division,
            Some(&"blockquote") => BlockKind::Quote,
            Some(tag) => BlockKind::Heading(tag[1..].parse().unwrap_or(1)),
            None => BlockKind::Division,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
}

// Every matched element yields one entry, even an empty one, since blocks are
// addressed by position.
pub fn extract_blocks(markup: &str) -> Vec<String> {
    BLOCK_RE
        .captures_iter(markup)
        .map(|caps| strip_tags(inner_markup(&caps).1))
        .collect()
}

pub fn extract_tagged_blocks(markup: &str) -> Vec<Block> {
    BLOCK_RE
        .captures_iter(markup)
        .map(|caps| {
            let (group, inner) = inner_markup(&caps);
            Block {
                kind: BlockKind::from_group(group),
                text: strip_tags(inner),
            }
        })
        .collect()
}

pub fn strip_tags(markup: &str) -> String {
    let text = TAG_RE.replace_all(markup, "");
    decode_entities(text.trim()).trim().to_string()
}

// Index into BLOCK_TAGS of the alternative that matched, and its body.
fn inner_markup<'h>(caps: &Captures<'h>) -> (usize, &'h str) {
    caps.iter()
        .skip(1)
        .enumerate()
        .find_map(|(group, m)| m.map(|m| (group, m.as_str())))
        .unwrap_or((0, ""))
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            decode_entity(name).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "ndash" => '\u{2013}',
        "mdash" => '\u{2014}',
        "hellip" => '\u{2026}',
        _ => return None,
    };
    Some(ch.to_string())
}

#[cfg(test)]
mod tests {
    use super::{decode_entities, extract_blocks, extract_tagged_blocks, BlockKind, strip_tags};
    use proptest::prelude::*;

    fn markup() -> impl Strategy<Value = String> {
        let tag = prop::sample::select(vec![
            "<p>",
            "</p>",
            "<h2 id=\"x\">",
            "</h2>",
            "<li>",
            "</li>",
            "<div>",
            "</div>",
            "<blockquote>",
            "</blockquote>",
            "<em>",
            "</em>",
            "&amp;",
            "&#x41;",
        ])
        .prop_map(str::to_string);
        let piece = prop_oneof![tag, "[a-zA-Z <>&;\n]{0,8}"];
        proptest::collection::vec(piece, 0..40).prop_map(|pieces| pieces.concat())
    }

    #[test]
    fn extracts_paragraphs_in_order() {
        assert_eq!(extract_blocks("<p>A</p><p>B</p><p>C</p>"), vec!["A", "B", "C"]);
        assert_eq!(extract_blocks("<p>A</p><p>X</p><p>C</p>"), vec!["A", "X", "C"]);
    }

    #[test]
    fn empty_input_has_no_blocks() {
        assert!(extract_blocks("").is_empty());
        assert!(extract_blocks("just text, no elements").is_empty());
    }

    #[test]
    fn empty_elements_keep_their_position() {
        let blocks = extract_blocks("<p>one</p><p>  </p><p><br/></p><p>four</p>");
        assert_eq!(blocks, vec!["one", "", "", "four"]);
    }

    #[test]
    fn covers_every_block_tag() {
        let markup = "<h1>T</h1><h2>S</h2><h6>x</h6><ul><li>item</li></ul>\
                      <blockquote>q</blockquote><div>d</div>";
        assert_eq!(extract_blocks(markup), vec!["T", "S", "x", "item", "q", "d"]);
    }

    #[test]
    fn strips_nested_inline_markup_and_attributes() {
        let markup = r#"<p class="body">Hello <strong>bold</strong> <a href="x">link</a></p>"#;
        assert_eq!(extract_blocks(markup), vec!["Hello bold link"]);
    }

    #[test]
    fn outer_element_wins_over_nested_blocks() {
        let blocks = extract_blocks("<div><p>inner</p></div><p>after</p>");
        assert_eq!(blocks, vec!["inner", "after"]);
        assert_eq!(extract_blocks("<blockquote><p>a</p><p>b</p></blockquote>"), vec!["ab"]);
    }

    #[test]
    fn does_not_confuse_similar_tag_names() {
        let blocks = extract_blocks("<pre>code</pre><param>x</param><p>real</p>");
        assert_eq!(blocks, vec!["real"]);
    }

    #[test]
    fn matches_tags_case_insensitively_across_lines() {
        let blocks = extract_blocks("<P>first\nline</P>\n<Li>\n  two\n</Li>");
        assert_eq!(blocks, vec!["first\nline", "two"]);
    }

    #[test]
    fn unclosed_elements_merge_or_vanish() {
        assert_eq!(extract_blocks("<p>open <p>closed</p>"), vec!["open closed"]);
        assert!(extract_blocks("<p>dangling").is_empty());
    }

    #[test]
    fn strip_tags_trims_and_decodes() {
        assert_eq!(strip_tags("  <em>&lt;b&gt;</em> "), "<b>");
    }

    proptest! {
        #[test]
        fn extraction_is_deterministic(markup in markup()) {
            prop_assert_eq!(extract_blocks(&markup), extract_blocks(&markup));
        }

        #[test]
        fn tagged_and_plain_extraction_agree(markup in markup()) {
            let texts: Vec<String> = extract_tagged_blocks(&markup).into_iter().map(|b| b.text).collect();
            prop_assert_eq!(texts, extract_blocks(&markup));
        }

        #[test]
        fn block_text_is_trimmed(markup in markup()) {
            for block in extract_blocks(&markup) {
                prop_assert_eq!(block.trim(), block.as_str());
            }
        }
    }

    #[test]
    fn decodes_character_references() {
        assert_eq!(decode_entities("a &amp; b &lt;c&gt; &#65;&#x42;"), "a & b <c> AB");
        assert_eq!(decode_entities("&unknown; stays"), "&unknown; stays");
        assert_eq!(extract_blocks("<p>Fish &amp; Chips</p>"), vec!["Fish & Chips"]);
    }

    #[test]
    fn tagged_blocks_line_up_with_plain_blocks() {
        let markup = "<h2>Head</h2><p>para</p><li>item</li><blockquote>q</blockquote><div>d</div>";
        let tagged = extract_tagged_blocks(markup);
        let kinds: Vec<BlockKind> = tagged.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Heading(2),
                BlockKind::Paragraph,
                BlockKind::ListItem,
                BlockKind::Quote,
                BlockKind::Division,
            ]
        );
        let texts: Vec<String> = tagged.into_iter().map(|b| b.text).collect();
        assert_eq!(texts, extract_blocks(markup));
    }
}
