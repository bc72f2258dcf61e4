use std::ops::Range;

pub const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    case_sensitive: bool,
}

impl Query {
    // Shorter queries would light up most of a document.
    pub fn new(text: &str, case_sensitive: bool) -> Option<Self> {
        let text = text.trim();
        if text.chars().count() < MIN_QUERY_LEN {
            return None;
        }
        let text = if case_sensitive {
            text.to_string()
        } else {
            text.to_ascii_lowercase()
        };
        Some(Self {
            text,
            case_sensitive,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    // Byte ranges of non-overlapping hits in `hay`. ASCII folding keeps
    // offsets valid for the original text.
    pub fn ranges_in(&self, hay: &str) -> Vec<Range<usize>> {
        let folded;
        let hay = if self.case_sensitive {
            hay
        } else {
            folded = hay.to_ascii_lowercase();
            folded.as_str()
        };
        let mut out = Vec::new();
        let mut cursor = 0;
        while let Some(found) = hay[cursor..].find(&self.text) {
            let start = cursor + found;
            let end = start + self.text.len();
            out.push(start..end);
            cursor = end;
        }
        out
    }
}

// Index reached by stepping `delta` matches from `current`, wrapping at both ends.
pub fn step(current: usize, delta: isize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    (current as isize + delta).rem_euclid(total as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::{step, Query};

    #[test]
    fn short_queries_are_rejected() {
        assert!(Query::new("", false).is_none());
        assert!(Query::new(" a ", false).is_none());
        assert!(Query::new("é", true).is_none());
        assert_eq!(Query::new("  ab ", false).unwrap().as_str(), "ab");
    }

    #[test]
    fn matching_ignores_ascii_case_by_default() {
        let query = Query::new("Diff", false).unwrap();
        assert_eq!(query.ranges_in("diff DIFF"), vec![0..4, 5..9]);
        assert!(query.ranges_in("none").is_empty());
    }

    #[test]
    fn case_sensitive_matching() {
        let query = Query::new("Diff", true).unwrap();
        assert_eq!(query.ranges_in("diff Diff"), vec![5..9]);
    }

    #[test]
    fn hits_do_not_overlap() {
        let query = Query::new("aa", false).unwrap();
        assert_eq!(query.ranges_in("aaaaa"), vec![0..2, 2..4]);
    }

    #[test]
    fn offsets_survive_multibyte_text() {
        let query = Query::new("CAFÉ", false).unwrap();
        let hay = "Le Café, le CAFÉ";
        let ranges = query.ranges_in(hay);
        assert_eq!(ranges.len(), 1);
        assert_eq!(&hay[ranges[0].clone()], "CAFÉ");
    }

    #[test]
    fn stepping_wraps_around() {
        assert_eq!(step(0, 1, 3), 1);
        assert_eq!(step(2, 1, 3), 0);
        assert_eq!(step(0, -1, 3), 2);
        assert_eq!(step(0, 1, 0), 0);
    }
}
