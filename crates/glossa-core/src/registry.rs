use std::collections::BTreeMap;

use crate::error::Result;
use crate::scope::ScopePath;

/// Which directory owns which glossary document. At most one document per
/// directory; registering a second replaces the mapping. Owned by the engine
/// and injected where needed, never a global.
#[derive(Debug, Clone, Default)]
pub struct GlossaryRegistry {
    docs: BTreeMap<ScopePath, String>,
}

impl GlossaryRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a glossary document under its containing directory. Returns
    /// the owning scope.
    pub fn register(&mut self, doc_path: &str) -> Result<ScopePath> {
        let scope = ScopePath::from_document_path(doc_path)?;
        self.docs.insert(scope.clone(), doc_path.to_string());
        Ok(scope)
    }

    /// Drop the registration for a document's directory, whether or not one
    /// existed. Returns the scope that was (possibly) unregistered.
    pub fn remove(&mut self, doc_path: &str) -> Result<ScopePath> {
        let scope = ScopePath::from_document_path(doc_path)?;
        self.docs.remove(&scope);
        Ok(scope)
    }

    #[must_use]
    pub fn get(&self, scope: &ScopePath) -> Option<&str> {
        self.docs.get(scope).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn clear(&mut self) {
        self.docs.clear();
    }

    /// All registrations, shallowest scope first. Rebuilds must apply
    /// ancestor documents before descendant overrides.
    #[must_use]
    pub fn sorted_by_depth(&self) -> Vec<(ScopePath, String)> {
        let mut out: Vec<(ScopePath, String)> = self
            .docs
            .iter()
            .map(|(scope, path)| (scope.clone(), path.clone()))
            .collect();
        out.sort_by_key(|(scope, _)| scope.depth());
        out
    }

    /// Registrations at or nested within `scope`, shallowest first.
    #[must_use]
    pub fn within(&self, scope: &ScopePath) -> Vec<(ScopePath, String)> {
        self.sorted_by_depth()
            .into_iter()
            .filter(|(registered, _)| registered.starts_with(scope))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(raw: &str) -> ScopePath {
        ScopePath::parse(raw).expect("scope")
    }

    #[test]
    fn register_maps_document_to_its_directory() {
        let mut registry = GlossaryRegistry::new();
        let owner = registry.register("docs/api/glossary.md").expect("register");
        assert_eq!(owner, scope("docs/api"));
        assert_eq!(
            registry.get(&scope("docs/api")),
            Some("docs/api/glossary.md")
        );
        assert!(registry.get(&scope("docs")).is_none());
    }

    #[test]
    fn second_registration_for_a_directory_replaces_the_first() {
        let mut registry = GlossaryRegistry::new();
        registry.register("docs/glossary.md").expect("register");
        registry.register("docs/terms.md").expect("register");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&scope("docs")), Some("docs/terms.md"));
    }

    #[test]
    fn remove_is_a_no_op_for_unknown_documents() {
        let mut registry = GlossaryRegistry::new();
        let owner = registry.remove("never/registered.md").expect("remove");
        assert_eq!(owner, scope("never"));
        assert!(registry.is_empty());
    }

    #[test]
    fn depth_ordering_puts_ancestors_first() {
        let mut registry = GlossaryRegistry::new();
        registry.register("a/b/c/glossary.md").expect("register");
        registry.register("glossary.md").expect("register");
        registry.register("a/glossary.md").expect("register");
        let depths: Vec<usize> = registry
            .sorted_by_depth()
            .iter()
            .map(|(scope, _)| scope.depth())
            .collect();
        assert_eq!(depths, [0, 1, 3]);
    }

    #[test]
    fn within_filters_to_the_requested_subtree() {
        let mut registry = GlossaryRegistry::new();
        registry.register("glossary.md").expect("register");
        registry.register("docs/glossary.md").expect("register");
        registry.register("docs/api/glossary.md").expect("register");
        registry.register("other/glossary.md").expect("register");

        let within: Vec<String> = registry
            .within(&scope("docs"))
            .into_iter()
            .map(|(_, path)| path)
            .collect();
        assert_eq!(within, ["docs/glossary.md", "docs/api/glossary.md"]);

        let all = registry.within(&ScopePath::root());
        assert_eq!(all.len(), 4);
    }
}
