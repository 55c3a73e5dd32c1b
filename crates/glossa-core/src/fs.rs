use std::fs;
use std::path::{Component, Path, PathBuf};

use globset::GlobSet;
use walkdir::WalkDir;

use crate::error::{GlossaError, Result};

/// Root-anchored access to the document tree. All paths are tree-relative,
/// `/`-separated strings; anything that would escape the root is refused.
#[derive(Debug, Clone)]
pub struct DocStore {
    root: PathBuf,
}

impl DocStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let mut out = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(segment) => out.push(segment),
                Component::CurDir => {}
                _ => {
                    return Err(GlossaError::PathOutsideRoot(relative.to_string()));
                }
            }
        }
        Ok(out)
    }

    #[must_use]
    pub fn exists(&self, relative: &str) -> bool {
        self.resolve(relative).is_ok_and(|path| path.exists())
    }

    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.resolve(relative)?;
        if !path.exists() {
            return Err(GlossaError::NotFound(relative.to_string()));
        }
        Ok(fs::read_to_string(path)?)
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<()> {
        let path = self.resolve(relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Tree-relative paths of every file whose name matches `matcher`,
    /// skipping dot-directories. Order follows the directory walk.
    pub fn find_documents(&self, matcher: &GlobSet) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let walk = WalkDir::new(&self.root).into_iter().filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with('.')
        });
        for entry in walk {
            let entry = entry.map_err(|err| {
                GlossaError::Validation(format!("document walk failed: {err}"))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !matcher.is_match(entry.file_name()) {
                continue;
            }
            if let Some(relative) = self.relative_path(entry.path()) {
                out.push(relative);
            }
        }
        Ok(out)
    }

    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(segment) => Some(segment.to_string_lossy().to_string()),
                _ => None,
            })
            .collect();
        if segments.is_empty() {
            None
        } else {
            Some(segments.join("/"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globset::{Glob, GlobSetBuilder};

    fn matcher(name: &str) -> GlobSet {
        let mut builder = GlobSetBuilder::new();
        builder.add(Glob::new(name).expect("glob"));
        builder.build().expect("globset")
    }

    #[test]
    fn read_write_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DocStore::new(dir.path());
        store
            .write("docs/glossary.md", "# Word\n\nbody\n")
            .expect("write");
        assert!(store.exists("docs/glossary.md"));
        let text = store.read("docs/glossary.md").expect("read");
        assert_eq!(text, "# Word\n\nbody\n");
    }

    #[test]
    fn missing_document_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DocStore::new(dir.path());
        let err = store.read("absent.md").expect_err("must fail");
        assert!(matches!(err, GlossaError::NotFound(_)));
    }

    #[test]
    fn escaping_paths_are_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DocStore::new(dir.path());
        let err = store.read("../outside.md").expect_err("must fail");
        assert!(matches!(err, GlossaError::PathOutsideRoot(_)));
        let err = store.write("/etc/absolute.md", "x").expect_err("must fail");
        assert!(matches!(err, GlossaError::PathOutsideRoot(_)));
    }

    #[test]
    fn find_documents_matches_by_file_name_and_skips_dot_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = DocStore::new(dir.path());
        store.write("glossary.md", "").expect("write");
        store.write("docs/glossary.md", "").expect("write");
        store.write("docs/notes.md", "").expect("write");
        store.write(".glossa/glossary.md", "").expect("write");

        let mut found = store
            .find_documents(&matcher("glossary.md"))
            .expect("walk");
        found.sort();
        assert_eq!(found, ["docs/glossary.md", "glossary.md"]);
    }
}
