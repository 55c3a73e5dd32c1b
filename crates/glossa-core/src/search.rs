use serde::{Deserialize, Serialize};

use crate::forest::DefinitionForest;

/// One recognized phrase occurrence. Offsets are 0-based character
/// positions, `from` inclusive and `to` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseMatch {
    pub key: String,
    pub from: usize,
    pub to: usize,
}

/// Scans lines of text against one forest.
#[derive(Debug)]
pub struct Searcher<'a> {
    forest: &'a DefinitionForest,
}

impl<'a> Searcher<'a> {
    #[must_use]
    pub const fn new(forest: &'a DefinitionForest) -> Self {
        Self { forest }
    }

    /// Greedy left-to-right scan: at every unmatched position try the
    /// longest match, emit it and jump past it, otherwise advance one
    /// character. `base_offset` shifts reported positions for callers
    /// scanning a line that starts mid-document.
    #[must_use]
    pub fn find(&self, line: &str, base_offset: usize) -> Vec<PhraseMatch> {
        let chars: Vec<char> = line.chars().collect();
        let mut matches = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            if let Some(def) = self.forest.match_longest(&chars, i) {
                let len = def.key.chars().count();
                if len > 0 {
                    matches.push(PhraseMatch {
                        key: def.key.clone(),
                        from: base_offset + i,
                        to: base_offset + i + len,
                    });
                    i += len;
                    continue;
                }
            }
            i += 1;
        }
        matches
    }
}

/// Display filter: sort by `from` ascending then `to` descending and keep
/// only matches that start at or after the previous kept end, so overlapping
/// clusters collapse to the earliest-starting, longest-available match.
#[must_use]
pub fn resolve_overlaps(mut matches: Vec<PhraseMatch>) -> Vec<PhraseMatch> {
    matches.sort_by(|a, b| a.from.cmp(&b.from).then(b.to.cmp(&a.to)));
    let mut cursor = 0;
    matches
        .into_iter()
        .filter(|m| {
            if m.from < cursor {
                return false;
            }
            cursor = m.to;
            true
        })
        .collect()
}

/// Stateless cursor query: binary search a `from`-sorted, non-overlapping
/// match list for the span containing `offset` (end position inclusive, so a
/// cursor sitting just past the last character still resolves).
#[must_use]
pub fn phrase_at(matches: &[PhraseMatch], offset: usize) -> Option<&PhraseMatch> {
    let mut lo = 0;
    let mut hi = matches.len();
    while lo < hi {
        let mid = usize::midpoint(lo, hi);
        let m = &matches[mid];
        if offset < m.from {
            hi = mid;
        } else if offset > m.to {
            lo = mid + 1;
        } else {
            return Some(m);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::forest::fold_key;
    use crate::parse::{Definition, DefinitionSource, LineRange};
    use crate::scope::ScopePath;

    fn forest_with(keys: &[&str]) -> DefinitionForest {
        let mut forest = DefinitionForest::new();
        for key in keys {
            forest.insert(Arc::new(Definition {
                key: fold_key(key),
                word: (*key).to_string(),
                aliases: Vec::new(),
                contents: String::new(),
                source: DefinitionSource {
                    path: "glossary.md".to_string(),
                    dir: ScopePath::root(),
                },
                position: LineRange::default(),
            }));
        }
        forest
    }

    fn m(key: &str, from: usize, to: usize) -> PhraseMatch {
        PhraseMatch {
            key: key.to_string(),
            from,
            to,
        }
    }

    #[test]
    fn finds_single_occurrence_with_offsets() {
        let forest = forest_with(&["api"]);
        let matches = Searcher::new(&forest).find("The api is great", 0);
        assert_eq!(matches, vec![m("api", 4, 7)]);
    }

    #[test]
    fn base_offset_shifts_reported_positions() {
        let forest = forest_with(&["api"]);
        let matches = Searcher::new(&forest).find("api", 100);
        assert_eq!(matches, vec![m("api", 100, 103)]);
    }

    #[test]
    fn scan_jumps_past_matches_and_prefers_longest() {
        let forest = forest_with(&["api", "api gateway", "trie"]);
        let matches = Searcher::new(&forest).find("api gateway beats a trie, api too", 0);
        assert_eq!(
            matches,
            vec![m("api gateway", 0, 11), m("trie", 20, 24), m("api", 26, 29)]
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let forest = forest_with(&["API Gateway"]);
        let matches = Searcher::new(&forest).find("an api gateway here", 0);
        assert_eq!(matches, vec![m("api gateway", 3, 14)]);
    }

    #[test]
    fn resolve_overlaps_keeps_earliest_longest_per_cluster() {
        let raw = vec![m("b", 2, 5), m("a", 0, 3), m("ab", 0, 6), m("c", 7, 9)];
        let resolved = resolve_overlaps(raw);
        assert_eq!(resolved, vec![m("ab", 0, 6), m("c", 7, 9)]);
    }

    #[test]
    fn resolved_matches_never_overlap() {
        let raw = vec![m("x", 0, 4), m("y", 1, 8), m("z", 4, 6), m("w", 6, 7)];
        let resolved = resolve_overlaps(raw);
        for pair in resolved.windows(2) {
            assert!(pair[0].to <= pair[1].from);
        }
    }

    #[test]
    fn phrase_at_binary_search_hits_containing_span() {
        let matches = vec![m("a", 0, 3), m("b", 10, 14), m("c", 20, 28)];
        assert_eq!(phrase_at(&matches, 0).map(|p| p.key.as_str()), Some("a"));
        assert_eq!(phrase_at(&matches, 12).map(|p| p.key.as_str()), Some("b"));
        assert_eq!(phrase_at(&matches, 28).map(|p| p.key.as_str()), Some("c"));
        assert!(phrase_at(&matches, 5).is_none());
        assert!(phrase_at(&matches, 40).is_none());
        assert!(phrase_at(&[], 0).is_none());
    }
}
