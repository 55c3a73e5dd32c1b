use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;

use crate::compose::{self, DefinitionDraft};
use crate::config::EngineConfig;
use crate::error::{GlossaError, Result};
use crate::forest::{DefinitionForest, fold_key};
use crate::fs::DocStore;
use crate::jsonl::{self, EventAction, IndexEvent};
use crate::parse::{self, Definition, DefinitionSource};
use crate::registry::GlossaryRegistry;
use crate::scope::ScopePath;
use crate::scope_tree::ScopeTree;
use crate::search::{PhraseMatch, Searcher, resolve_overlaps};

const EVENT_LOG_PATH: &str = ".glossa/events.jsonl";

#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub root: String,
    pub registrations: usize,
    pub materialized_scopes: usize,
    pub root_definitions: usize,
    pub last_rebuilt_at: Option<DateTime<Utc>>,
}

/// Façade over the index: owns the document store, the glossary registry and
/// the scope tree, and turns document-change notifications into index
/// updates. Single-threaded by design; callers deliver change events one at
/// a time.
#[derive(Debug)]
pub struct GlossaEngine {
    store: DocStore,
    config: EngineConfig,
    matcher: GlobSet,
    registry: GlossaryRegistry,
    tree: ScopeTree,
    fingerprints: HashMap<String, blake3::Hash>,
    last_rebuilt_at: Option<DateTime<Utc>>,
}

impl GlossaEngine {
    pub fn new(root: impl Into<PathBuf>, config: EngineConfig) -> Result<Self> {
        let glob = Glob::new(&config.glossary_file_name).map_err(|err| {
            GlossaError::Validation(format!(
                "invalid glossary file pattern '{}': {err}",
                config.glossary_file_name
            ))
        })?;
        let mut builder = GlobSetBuilder::new();
        builder.add(glob);
        let matcher = builder
            .build()
            .map_err(|err| GlossaError::Validation(format!("glob build failed: {err}")))?;
        Ok(Self {
            store: DocStore::new(root),
            config,
            matcher,
            registry: GlossaryRegistry::new(),
            tree: ScopeTree::new(),
            fingerprints: HashMap::new(),
            last_rebuilt_at: None,
        })
    }

    /// Construct with environment-derived configuration.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        Self::new(root, EngineConfig::from_env())
    }

    #[must_use]
    pub fn registry(&self) -> &GlossaryRegistry {
        &self.registry
    }

    /// Walk the document tree, register every glossary document and build the
    /// index from scratch, shallowest scope first.
    pub fn bootstrap(&mut self) -> Result<()> {
        let docs = self.store.find_documents(&self.matcher)?;
        self.registry.clear();
        self.tree = ScopeTree::new();
        self.fingerprints.clear();
        for doc_path in &docs {
            self.registry.register(doc_path)?;
        }
        for (scope, doc_path) in self.registry.sorted_by_depth() {
            let defs = self.load_definitions(&doc_path)?;
            self.tree.set_defs(defs, &scope);
        }
        self.last_rebuilt_at = Some(Utc::now());
        self.log(
            EventAction::Bootstrap,
            &ScopePath::root(),
            Some(format!("{} documents", self.registry.len())),
        );
        Ok(())
    }

    /// Re-derive the subtree at `scope` from its registered documents. All
    /// documents are read before the subtree is cleared, so a read failure
    /// leaves the previous index in place.
    pub fn rebuild(&mut self, scope: &ScopePath) -> Result<()> {
        let mut batches = Vec::new();
        for (reg_scope, doc_path) in self.registry.within(scope) {
            batches.push((reg_scope, self.load_definitions(&doc_path)?));
        }
        self.tree.clear(scope);
        for (reg_scope, defs) in batches {
            self.tree.set_defs(defs, &reg_scope);
        }
        self.last_rebuilt_at = Some(Utc::now());
        self.log(EventAction::Rebuild, scope, None);
        Ok(())
    }

    /// Re-parse the single document registered for `scope` and push its
    /// definitions. A scope without a registration is a no-op, not an error.
    pub fn update(&mut self, scope: &ScopePath) -> Result<()> {
        let Some(doc_path) = self.registry.get(scope).map(ToString::to_string) else {
            return Ok(());
        };
        let defs = self.load_definitions(&doc_path)?;
        self.tree.set_defs(defs, scope);
        self.log(EventAction::Update, scope, Some(doc_path));
        Ok(())
    }

    pub fn document_created(&mut self, path: &str) -> Result<()> {
        if !self.is_glossary_document(path) {
            return Ok(());
        }
        let scope = self.registry.register(path)?;
        self.log(EventAction::Register, &scope, Some(path.to_string()));
        Ok(())
    }

    /// Re-index a modified glossary document, skipping the reparse entirely
    /// when its content fingerprint is unchanged.
    pub fn document_modified(&mut self, path: &str) -> Result<()> {
        if !self.is_glossary_document(path) {
            return Ok(());
        }
        let scope = ScopePath::from_document_path(path)?;
        if self.registry.get(&scope) != Some(path) {
            return Ok(());
        }
        let text = self.store.read(path)?;
        let digest = blake3::hash(text.as_bytes());
        if self.fingerprints.get(path) == Some(&digest) {
            return Ok(());
        }
        self.fingerprints.insert(path.to_string(), digest);
        let defs = parse_definitions(path, &text)?;
        self.tree.set_defs(defs, &scope);
        self.log(EventAction::Update, &scope, Some(path.to_string()));
        Ok(())
    }

    pub fn document_deleted(&mut self, path: &str) -> Result<()> {
        if !self.is_glossary_document(path) {
            return Ok(());
        }
        let scope = self.registry.remove(path)?;
        self.fingerprints.remove(path);
        self.log(EventAction::Remove, &scope, Some(path.to_string()));
        self.rebuild(&scope)
    }

    pub fn document_renamed(&mut self, new_path: &str, old_path: &str) -> Result<()> {
        if self.is_glossary_document(old_path) {
            let scope = self.registry.remove(old_path)?;
            self.fingerprints.remove(old_path);
            self.log(EventAction::Remove, &scope, Some(old_path.to_string()));
            self.rebuild(&scope)?;
        }
        if self.is_glossary_document(new_path) {
            let scope = self.registry.register(new_path)?;
            self.log(EventAction::Register, &scope, Some(new_path.to_string()));
            self.update(&scope)?;
        }
        Ok(())
    }

    pub fn lookup(&mut self, key: &str, scope: &ScopePath) -> Option<Arc<Definition>> {
        self.tree.get_def(key, scope)
    }

    /// Forest handle for bulk scanning against `scope`.
    pub fn forest(&mut self, scope: &ScopePath) -> &DefinitionForest {
        self.tree.forest(scope)
    }

    /// Every definition visible at `scope`, in key order.
    pub fn definitions(&mut self, scope: &ScopePath) -> Vec<Arc<Definition>> {
        self.tree.forest(scope).definitions()
    }

    /// Non-overlapping longest matches for one line of text.
    pub fn scan(&mut self, line: &str, scope: &ScopePath, base_offset: usize) -> Vec<PhraseMatch> {
        let forest = self.tree.forest(scope);
        resolve_overlaps(Searcher::new(forest).find(line, base_offset))
    }

    /// Scan a whole document against its own scope, offsets counted in
    /// characters over the full text.
    pub fn scan_document(&mut self, path: &str) -> Result<Vec<PhraseMatch>> {
        let text = self.store.read(path)?;
        let scope = ScopePath::from_document_path(path)?;
        let forest = self.tree.forest(&scope);
        let searcher = Searcher::new(forest);
        let mut matches = Vec::new();
        let mut offset = 0;
        for line in text.split('\n') {
            matches.extend(searcher.find(line, offset));
            offset += line.chars().count() + 1;
        }
        Ok(resolve_overlaps(matches))
    }

    pub fn read_document(&self, path: &str) -> Result<String> {
        self.store.read(path)
    }

    /// Append a new entry to the glossary document owning `scope`, creating
    /// and registering the document when the scope has none yet.
    pub fn add_definition(&mut self, draft: &DefinitionDraft, scope: &ScopePath) -> Result<()> {
        if draft.word.trim().is_empty() {
            return Err(GlossaError::Validation(
                "definition word must not be empty".to_string(),
            ));
        }
        let doc_path = match self.registry.get(scope) {
            Some(path) => path.to_string(),
            None => {
                if scope.is_root() {
                    self.config.glossary_file_name.clone()
                } else {
                    format!("{scope}/{}", self.config.glossary_file_name)
                }
            }
        };
        let existing = if self.store.exists(&doc_path) {
            self.store.read(&doc_path)?
        } else {
            String::new()
        };
        let updated = compose::append_entry(&existing, draft);
        self.store.write(&doc_path, &updated)?;
        if self.registry.get(scope).is_none() {
            self.registry.register(&doc_path)?;
        }
        self.log(EventAction::Add, scope, Some(fold_key(&draft.word)));
        self.update(scope)
    }

    /// Rewrite the canonical entry block for `key` as visible from `scope`.
    /// The block is re-located by key in the document's current content
    /// first; an entry that moved away or disappeared aborts the edit.
    pub fn edit_definition(
        &mut self,
        key: &str,
        scope: &ScopePath,
        aliases: Vec<String>,
        contents: String,
    ) -> Result<()> {
        let folded = fold_key(key.trim());
        let current = self
            .tree
            .get_def(&folded, scope)
            .ok_or_else(|| GlossaError::NotFound(format!("no definition for key: {folded}")))?;
        let doc_path = current.source.path.clone();
        let owner = current.source.dir.clone();
        let text = self.store.read(&doc_path)?;
        let fresh = parse_definitions(&doc_path, &text)?;
        let target = fresh.iter().find(|def| def.key == folded).ok_or_else(|| {
            GlossaError::StaleEdit(format!("definition '{folded}' is no longer in {doc_path}"))
        })?;
        let draft = DefinitionDraft {
            word: target.word.clone(),
            aliases,
            contents,
        };
        let updated = compose::splice_entry(&text, target.position, &draft)?;
        self.store.write(&doc_path, &updated)?;
        self.log(EventAction::Edit, &owner, Some(folded));
        self.update(&owner)
    }

    pub fn status(&mut self) -> EngineStatus {
        let root_definitions = self.tree.forest(&ScopePath::root()).len();
        EngineStatus {
            root: self.store.root().display().to_string(),
            registrations: self.registry.len(),
            materialized_scopes: self.tree.materialized_scopes(),
            root_definitions,
            last_rebuilt_at: self.last_rebuilt_at,
        }
    }

    /// Events recorded so far; empty when logging is disabled.
    pub fn events(&self) -> Result<Vec<IndexEvent>> {
        if !self.store.exists(EVENT_LOG_PATH) {
            return Ok(Vec::new());
        }
        let raw = self.store.read(EVENT_LOG_PATH)?;
        Ok(jsonl::parse_jsonl_tolerant(&raw).items)
    }

    fn is_glossary_document(&self, path: &str) -> bool {
        let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
        self.matcher.is_match(name)
    }

    fn load_definitions(&mut self, doc_path: &str) -> Result<Vec<Arc<Definition>>> {
        let text = self.store.read(doc_path)?;
        self.fingerprints
            .insert(doc_path.to_string(), blake3::hash(text.as_bytes()));
        parse_definitions(doc_path, &text)
    }

    fn log(&self, action: EventAction, scope: &ScopePath, detail: Option<String>) {
        if !self.config.event_log_enabled {
            return;
        }
        let Ok(path) = self.store.resolve(EVENT_LOG_PATH) else {
            return;
        };
        jsonl::append_event(&path, &IndexEvent::now(action, scope, detail));
    }
}

/// Parse one glossary document into `Arc`-shared records. Front matter is
/// stripped before parsing and positions are shifted back so they index the
/// full document, keeping splice edits aligned.
fn parse_definitions(doc_path: &str, text: &str) -> Result<Vec<Arc<Definition>>> {
    let source = DefinitionSource {
        path: doc_path.to_string(),
        dir: ScopePath::from_document_path(doc_path)?,
    };
    let (skipped, body) = parse::strip_front_matter(text);
    let mut defs = parse::parse_document(body, &source);
    if skipped > 0 {
        for def in &mut defs {
            def.position.from += skipped;
            def.position.to += skipped;
        }
    }
    Ok(defs.into_iter().map(Arc::new).collect())
}
