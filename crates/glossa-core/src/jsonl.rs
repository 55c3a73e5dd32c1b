use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::scope::ScopePath;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    Bootstrap,
    Rebuild,
    Update,
    Register,
    Remove,
    Add,
    Edit,
}

/// One line of the index event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEvent {
    pub at: DateTime<Utc>,
    pub action: EventAction,
    pub scope: ScopePath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IndexEvent {
    #[must_use]
    pub fn now(action: EventAction, scope: &ScopePath, detail: Option<String>) -> Self {
        Self {
            at: Utc::now(),
            action,
            scope: scope.clone(),
            detail,
        }
    }
}

/// Append one event line. Failures are swallowed: the event log is
/// observability, it must never break indexing.
pub fn append_event(path: &Path, event: &IndexEvent) {
    let Ok(line) = serde_json::to_string(event) else {
        return;
    };
    if let Some(parent) = path.parent() {
        if std::fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{line}");
    }
}

#[derive(Debug, Clone)]
pub struct JsonlParseOutcome<T> {
    pub items: Vec<T>,
    pub skipped_lines: usize,
    pub first_error: Option<(usize, String)>,
}

/// Parse a JSONL document, skipping blank and malformed lines while
/// remembering where the first failure happened.
pub fn parse_jsonl_tolerant<T>(raw: &str) -> JsonlParseOutcome<T>
where
    T: DeserializeOwned,
{
    let mut items = Vec::new();
    let mut skipped_lines = 0usize;
    let mut first_error = None::<(usize, String)>;

    for (line_no, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(line) {
            Ok(value) => items.push(value),
            Err(err) => {
                skipped_lines += 1;
                if first_error.is_none() {
                    first_error = Some((line_no + 1, err.to_string()));
                }
            }
        }
    }

    JsonlParseOutcome {
        items,
        skipped_lines,
        first_error,
    }
}
