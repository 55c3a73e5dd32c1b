use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::forest::{DefinitionForest, fold_key};
use crate::parse::Definition;
use crate::scope::ScopePath;

#[derive(Debug, Default)]
struct ScopeNode {
    children: HashMap<String, ScopeNode>,
    forest: DefinitionForest,
    keys: HashSet<String>,
    materialized: bool,
}

impl ScopeNode {
    /// Propagation phase: push an accepted insert into every materialized
    /// descendant, pruning wherever the insert changes nothing (a more
    /// specific override already shadows it there).
    fn propagate(&mut self, def: &Arc<Definition>) {
        for child in self.children.values_mut() {
            if !child.materialized {
                continue;
            }
            if child.forest.insert(def.clone()) {
                child.keys.insert(def.key.clone());
                child.propagate(def);
            }
        }
    }

    fn reset(&mut self) {
        self.children.clear();
        self.forest.clear();
        self.keys.clear();
        self.materialized = false;
    }

    fn count_materialized(&self) -> usize {
        usize::from(self.materialized)
            + self
                .children
                .values()
                .map(ScopeNode::count_materialized)
                .sum::<usize>()
    }
}

/// Hierarchy of per-directory forests. A node's forest is derived lazily on
/// first access by deep-cloning the nearest materialized ancestor's forest,
/// so every subtree sees an inherited, override-capable view of the glossary
/// and descendant mutation can never alias ancestor structure.
#[derive(Debug, Default)]
pub struct ScopeTree {
    root: ScopeNode,
}

impl ScopeTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Derivation phase: resolve the node for `scope`, materializing every
    /// node along the path from its nearest materialized ancestor.
    fn node_mut(&mut self, scope: &ScopePath) -> &mut ScopeNode {
        self.root.materialized = true;
        let mut node = &mut self.root;
        for component in scope.components() {
            let derived = (!node
                .children
                .get(component)
                .is_some_and(|child| child.materialized))
            .then(|| (node.forest.clone(), node.keys.clone()));
            let child = node.children.entry(component.clone()).or_default();
            if let Some((forest, keys)) = derived {
                child.forest = forest;
                child.keys = keys;
                child.materialized = true;
            }
            node = child;
        }
        node
    }

    /// Insert one definition at `scope` and cascade it into materialized
    /// descendants. Not-yet-materialized descendants pick it up later through
    /// ancestor derivation.
    pub fn set_def(&mut self, def: Arc<Definition>, scope: &ScopePath) {
        let node = self.node_mut(scope);
        if node.forest.insert(def.clone()) {
            node.keys.insert(def.key.clone());
            node.propagate(&def);
        }
    }

    pub fn set_defs<I>(&mut self, defs: I, scope: &ScopePath)
    where
        I: IntoIterator<Item = Arc<Definition>>,
    {
        for def in defs {
            self.set_def(def, scope);
        }
    }

    /// Definition visible for `key` at `scope`. The key set short-circuits
    /// misses without walking the forest.
    pub fn get_def(&mut self, key: &str, scope: &ScopePath) -> Option<Arc<Definition>> {
        let folded = fold_key(key.trim());
        let node = self.node_mut(scope);
        if !node.keys.contains(&folded) {
            return None;
        }
        node.forest.lookup(&folded)
    }

    /// The forest governing `scope`, materializing it if needed.
    pub fn forest(&mut self, scope: &ScopePath) -> &DefinitionForest {
        &self.node_mut(scope).forest
    }

    /// Fully reset the subtree rooted at `scope`: drop all child nodes, clear
    /// the local forest and key set, and un-materialize so the next access
    /// derives fresh from the (possibly since-changed) ancestor.
    pub fn clear(&mut self, scope: &ScopePath) {
        self.node_mut(scope).reset();
    }

    /// Number of materialized scope nodes, root included.
    #[must_use]
    pub fn materialized_scopes(&self) -> usize {
        self.root.count_materialized()
    }
}
