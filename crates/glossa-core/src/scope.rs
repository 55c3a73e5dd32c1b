use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{GlossaError, Result};

/// Directory-path identifier within the document tree. The root scope is the
/// empty component sequence and renders as `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopePath {
    components: Vec<String>,
}

impl ScopePath {
    #[must_use]
    pub const fn root() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Ok(Self::root());
        }
        let mut components = Vec::new();
        for component in trimmed.split(['/', '\\']) {
            if component.is_empty() || component == "." {
                continue;
            }
            if component == ".." {
                return Err(GlossaError::InvalidScope(value.to_string()));
            }
            components.push(component.to_string());
        }
        Ok(Self { components })
    }

    /// Scope of the directory containing `document_path` (its dirname).
    pub fn from_document_path(document_path: &str) -> Result<Self> {
        let mut scope = Self::parse(document_path)?;
        scope.components.pop();
        Ok(scope)
    }

    #[must_use]
    pub fn components(&self) -> &[String] {
        &self.components
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// True when `self` lies at or below `ancestor`.
    #[must_use]
    pub fn starts_with(&self, ancestor: &Self) -> bool {
        self.components.len() >= ancestor.components.len()
            && self
                .components
                .iter()
                .zip(ancestor.components.iter())
                .all(|(a, b)| a == b)
    }

    /// Character count of the rendered path. The forest's override policy
    /// compares owning directories by this weight, longer meaning more
    /// specific. Kept as the length comparison even though a depth count
    /// would rank `/a/bb` against `/ccccccc` differently.
    #[must_use]
    pub fn weight(&self) -> usize {
        if self.is_root() {
            1
        } else {
            self.components.iter().map(|c| c.chars().count()).sum::<usize>()
                + self.components.len()
                - 1
        }
    }
}

impl Display for ScopePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.components.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&self.components.join("/"))
        }
    }
}

impl FromStr for ScopePath {
    type Err = GlossaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ScopePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ScopePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}
