use crate::error::{GlossaError, Result};
use crate::parse::LineRange;

/// Authoring input for a new or edited glossary entry.
#[derive(Debug, Clone)]
pub struct DefinitionDraft {
    pub word: String,
    pub aliases: Vec<String>,
    pub contents: String,
}

/// Render a draft back into the glossary block convention: headword line,
/// optional alias line, body, each section separated by one blank line. The
/// terminator is not part of the block; it belongs to the surrounding
/// document.
#[must_use]
pub fn entry_lines(draft: &DefinitionDraft) -> Vec<String> {
    let mut lines = vec![format!("# {}", draft.word)];
    if !draft.aliases.is_empty() {
        lines.push(String::new());
        lines.push(format!("*{}*", draft.aliases.join(", ")));
    }
    lines.push(String::new());
    lines.push(draft.contents.trim_end().to_string());
    lines.push(String::new());
    lines
}

fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Append a new entry to existing glossary text, terminating the previous
/// last entry first when the document does not already end in one.
#[must_use]
pub fn append_entry(content: &str, draft: &DefinitionDraft) -> String {
    let mut lines: Vec<String> = split_lines(content)
        .into_iter()
        .map(ToString::to_string)
        .collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    if lines
        .last()
        .is_some_and(|line| !line.starts_with("---"))
    {
        lines.push(String::new());
        lines.push("---".to_string());
    }
    lines.extend(entry_lines(draft));
    lines.join("\n")
}

/// Splice an edited entry over its original line range. The range must still
/// point at an entry block in the current content; a range past the end or
/// one that no longer starts at a headword line means the document changed
/// underneath the edit, and the edit is abandoned.
pub fn splice_entry(content: &str, range: LineRange, draft: &DefinitionDraft) -> Result<String> {
    let lines = split_lines(content);
    if range.from > range.to || range.to >= lines.len() {
        return Err(GlossaError::StaleEdit(format!(
            "line range {}..{} is outside the document",
            range.from, range.to
        )));
    }
    if !lines[range.from].starts_with("# ") {
        return Err(GlossaError::StaleEdit(format!(
            "line {} is no longer a headword line",
            range.from
        )));
    }
    let mut out: Vec<String> = lines[..range.from]
        .iter()
        .map(ToString::to_string)
        .collect();
    out.extend(entry_lines(draft));
    out.extend(lines[range.to + 1..].iter().map(ToString::to_string));
    Ok(out.join("\n"))
}
