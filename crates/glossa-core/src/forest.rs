use std::collections::BTreeMap;
use std::sync::Arc;

use crate::parse::Definition;

/// Reserved child key marking a completed definition key. Parsed keys are
/// single-line and can never contain it.
const KEY_TERMINATOR: char = '\n';

pub(crate) fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Canonical lookup form of a key: every character folded through the same
/// single-scalar lowercase used when walking text.
#[must_use]
pub fn fold_key(key: &str) -> String {
    key.chars().map(fold_char).collect()
}

#[derive(Debug, Clone)]
enum ForestChild {
    Branch(DefinitionForest),
    Terminal(Arc<Definition>),
}

/// Character trie over folded definition keys. Each node maps a character to
/// either a deeper branch or, under the reserved terminator, the definition
/// completed by the path walked so far. `clone` deep-copies the node
/// structure while sharing the immutable definitions.
#[derive(Debug, Clone, Default)]
pub struct DefinitionForest {
    children: BTreeMap<char, ForestChild>,
}

impl DefinitionForest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition under its (already folded) key. Returns whether
    /// the terminal actually changed: an existing definition is replaced when
    /// the incoming one's owning directory is more specific, measured by
    /// rendered path length, or when it is the same directory — so a re-parse
    /// of the same document refreshes edited bodies without letting a
    /// different scope of coincidentally equal weight steal the slot.
    pub fn insert(&mut self, def: Arc<Definition>) -> bool {
        let key: Vec<char> = def.key.chars().collect();
        self.insert_at(&key, 0, def)
    }

    fn insert_at(&mut self, key: &[char], ptr: usize, def: Arc<Definition>) -> bool {
        if ptr == key.len() {
            return match self.children.get_mut(&KEY_TERMINATOR) {
                None => {
                    self.children
                        .insert(KEY_TERMINATOR, ForestChild::Terminal(def));
                    true
                }
                Some(ForestChild::Terminal(prior)) => {
                    if prior.source.dir.weight() < def.source.dir.weight()
                        || prior.source.dir == def.source.dir
                    {
                        *prior = def;
                        true
                    } else {
                        false
                    }
                }
                // A branch here means the key embedded the terminator; refuse.
                Some(ForestChild::Branch(_)) => false,
            };
        }
        match self
            .children
            .entry(key[ptr])
            .or_insert_with(|| ForestChild::Branch(Self::new()))
        {
            ForestChild::Branch(branch) => branch.insert_at(key, ptr + 1, def),
            ForestChild::Terminal(_) => false,
        }
    }

    /// Exact lookup; the key is trimmed and folded first.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<Arc<Definition>> {
        let folded = fold_key(key.trim());
        let mut node = self;
        for c in folded.chars() {
            match node.children.get(&c) {
                Some(ForestChild::Branch(branch)) => node = branch,
                _ => return None,
            }
        }
        node.terminal()
    }

    /// Longest key that is a prefix of `text` starting at `offset`
    /// (case-insensitive). The walk remembers the most recent completed
    /// terminal, so a longer dead-end never loses an earlier shorter match.
    #[must_use]
    pub fn match_longest(&self, text: &[char], offset: usize) -> Option<Arc<Definition>> {
        let mut node = self;
        let mut best = None;
        let mut ptr = offset;
        loop {
            if let Some(def) = node.terminal() {
                best = Some(def);
            }
            let Some(c) = text.get(ptr) else {
                break;
            };
            match node.children.get(&fold_char(*c)) {
                Some(ForestChild::Branch(branch)) => {
                    node = branch;
                    ptr += 1;
                }
                _ => break,
            }
        }
        best
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of stored definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children
            .values()
            .map(|child| match child {
                ForestChild::Branch(branch) => branch.len(),
                ForestChild::Terminal(_) => 1,
            })
            .sum()
    }

    /// All stored definitions in key order.
    #[must_use]
    pub fn definitions(&self) -> Vec<Arc<Definition>> {
        let mut out = Vec::new();
        self.collect_into(&mut out);
        out
    }

    fn collect_into(&self, out: &mut Vec<Arc<Definition>>) {
        for child in self.children.values() {
            match child {
                ForestChild::Terminal(def) => out.push(def.clone()),
                ForestChild::Branch(branch) => branch.collect_into(out),
            }
        }
    }

    fn terminal(&self) -> Option<Arc<Definition>> {
        match self.children.get(&KEY_TERMINATOR) {
            Some(ForestChild::Terminal(def)) => Some(def.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{DefinitionSource, LineRange};
    use crate::scope::ScopePath;

    fn def(key: &str, dir: &str) -> Arc<Definition> {
        Arc::new(Definition {
            key: fold_key(key),
            word: key.to_string(),
            aliases: Vec::new(),
            contents: format!("about {key}"),
            source: DefinitionSource {
                path: format!("{dir}/glossary.md"),
                dir: ScopePath::parse(dir).expect("scope"),
            },
            position: LineRange::default(),
        })
    }

    fn chars(text: &str) -> Vec<char> {
        text.chars().collect()
    }

    #[test]
    fn lookup_is_case_insensitive_and_trimmed() {
        let mut forest = DefinitionForest::new();
        assert!(forest.insert(def("API", "docs")));
        let hit = forest.lookup("  ApI ").expect("hit");
        assert_eq!(hit.word, "API");
        assert!(forest.lookup("apis").is_none());
        assert!(forest.lookup("ap").is_none());
    }

    #[test]
    fn longest_key_wins_when_both_are_prefixes() {
        let mut forest = DefinitionForest::new();
        forest.insert(def("api", "docs"));
        forest.insert(def("api gateway", "docs"));
        let text = chars("the API Gateway routes");
        let hit = forest.match_longest(&text, 4).expect("hit");
        assert_eq!(hit.key, "api gateway");
    }

    #[test]
    fn dead_end_falls_back_to_shorter_completed_match() {
        let mut forest = DefinitionForest::new();
        forest.insert(def("interface", "docs"));
        forest.insert(def("interface design", "docs"));
        let text = chars("interface dog");
        let hit = forest.match_longest(&text, 0).expect("hit");
        assert_eq!(hit.key, "interface");
    }

    #[test]
    fn no_match_at_offset_returns_none() {
        let mut forest = DefinitionForest::new();
        forest.insert(def("api", "docs"));
        assert!(forest.match_longest(&chars("zzz"), 0).is_none());
        assert!(forest.match_longest(&chars("api"), 3).is_none());
    }

    #[test]
    fn deeper_scope_shadows_shallower_for_same_key() {
        let mut forest = DefinitionForest::new();
        assert!(forest.insert(def("api", "docs")));
        assert!(forest.insert(def("api", "docs/internal")));
        let hit = forest.lookup("api").expect("hit");
        assert_eq!(hit.source.dir.to_string(), "docs/internal");

        // Shallower scope afterwards must not replace the deeper one.
        assert!(!forest.insert(def("api", "docs")));
        let hit = forest.lookup("api").expect("hit");
        assert_eq!(hit.source.dir.to_string(), "docs/internal");
    }

    #[test]
    fn equal_weight_from_another_scope_does_not_replace() {
        // Root renders as "/" (weight 1), colliding with any single-character
        // top-level directory. Same weight, different owner: keep the prior.
        let mut forest = DefinitionForest::new();
        assert!(forest.insert(def("api", "a")));
        assert!(!forest.insert(def("api", "/")));
        let hit = forest.lookup("api").expect("hit");
        assert_eq!(hit.source.dir.to_string(), "a");
    }

    #[test]
    fn equal_weight_replaces_so_reparses_refresh_content() {
        let mut forest = DefinitionForest::new();
        let first = def("api", "docs");
        let second = def("api", "docs");
        assert!(forest.insert(first));
        assert!(forest.insert(second.clone()));
        let hit = forest.lookup("api").expect("hit");
        assert!(Arc::ptr_eq(&hit, &second));
    }

    #[test]
    fn clone_is_structurally_independent() {
        let mut forest = DefinitionForest::new();
        forest.insert(def("api", "docs"));
        let snapshot = forest.clone();
        forest.insert(def("trie", "docs"));
        forest.clear();
        assert!(forest.is_empty());
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.lookup("api").is_some());
    }

    #[test]
    fn definitions_come_back_in_key_order() {
        let mut forest = DefinitionForest::new();
        forest.insert(def("trie", "docs"));
        forest.insert(def("api", "docs"));
        forest.insert(def("api gateway", "docs"));
        let keys: Vec<_> = forest
            .definitions()
            .iter()
            .map(|d| d.key.clone())
            .collect();
        assert_eq!(keys, ["api", "api gateway", "trie"]);
    }
}
