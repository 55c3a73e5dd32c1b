use serde::{Deserialize, Serialize};

use crate::forest::fold_key;
use crate::scope::ScopePath;

/// Owning glossary document of a definition: its path within the document
/// tree plus the containing directory, which is the scope the definition is
/// visible in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionSource {
    pub path: String,
    pub dir: ScopePath,
}

/// 0-based line range `[from, to]` of the parsed entry block, used to splice
/// an edited entry back over its original lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub from: usize,
    pub to: usize,
}

/// One glossary entry. Each alias of an entry yields an additional record
/// sharing every field except `key` (the folded alias) and `aliases` (empty
/// on alias records).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub key: String,
    pub word: String,
    pub aliases: Vec<String>,
    pub contents: String,
    pub source: DefinitionSource,
    pub position: LineRange,
}

fn is_entry_terminator(line: &str) -> bool {
    line.starts_with("---")
}

fn is_headword_line(line: &str) -> bool {
    line.starts_with("# ")
}

fn is_alias_line(line: &str) -> bool {
    let trimmed = line.trim_end();
    trimmed.starts_with('*') && trimmed.ends_with('*')
}

fn extract_headword(line: &str) -> String {
    line.strip_prefix("# ").unwrap_or("").trim().to_string()
}

fn extract_aliases(line: &str) -> Vec<String> {
    line.trim_end()
        .replace('*', "")
        .split([',', '|'])
        .map(str::trim)
        .filter(|alias| !alias.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[derive(Debug, Default)]
struct EntryBuffer {
    word: Option<String>,
    aliases: Vec<String>,
    contents: Option<String>,
    from: usize,
    to: usize,
}

impl EntryBuffer {
    /// Finalize the buffered entry into `out`. Entries without a headword are
    /// dropped; aliases attached to a dropped entry vanish with it.
    fn register(&mut self, source: &DefinitionSource, out: &mut Vec<Definition>) {
        if let Some(word) = self.word.take().filter(|word| !word.is_empty()) {
            let def = Definition {
                key: fold_key(&word),
                word,
                aliases: std::mem::take(&mut self.aliases),
                contents: self.contents.take().unwrap_or_default().trim().to_string(),
                source: source.clone(),
                position: LineRange {
                    from: self.from,
                    to: self.to,
                },
            };
            let mut alias_records = Vec::with_capacity(def.aliases.len());
            for alias in &def.aliases {
                alias_records.push(Definition {
                    key: fold_key(alias),
                    aliases: Vec::new(),
                    ..def.clone()
                });
            }
            out.push(def);
            out.append(&mut alias_records);
        }
        *self = Self::default();
    }
}

/// Parse one glossary document (front matter already stripped) into its
/// definition records. Total over any input; malformed entries are dropped or
/// tolerated, never an error.
#[must_use]
pub fn parse_document(text: &str, source: &DefinitionSource) -> Vec<Definition> {
    let mut defs = Vec::new();
    let mut buffer = EntryBuffer::default();
    let mut in_contents = false;
    let mut curr_line = 0usize;

    for (index, line) in text.split('\n').enumerate() {
        curr_line = index;
        let line = line.strip_suffix('\r').unwrap_or(line);

        if is_entry_terminator(line) {
            buffer.to = curr_line.saturating_sub(1);
            buffer.register(source, &mut defs);
            in_contents = false;
            continue;
        }
        if in_contents {
            let contents = buffer.contents.get_or_insert_with(String::new);
            contents.push_str(line);
            contents.push('\n');
            continue;
        }
        // Outside a body, empty lines are not significant.
        if line.is_empty() {
            continue;
        }
        if is_headword_line(line) {
            buffer.from = curr_line;
            buffer.word = Some(extract_headword(line));
            continue;
        }
        if is_alias_line(line) {
            buffer.aliases = extract_aliases(line);
            continue;
        }
        in_contents = true;
        buffer.contents = Some(format!("{line}\n"));
    }

    // End of input acts as an implicit terminator.
    buffer.to = curr_line;
    buffer.register(source, &mut defs);
    defs
}

/// Split off a leading YAML front-matter block, returning the number of
/// skipped lines and the remaining text. The parser itself never sees front
/// matter; callers shift parsed positions by the skip count so they index the
/// full document.
#[must_use]
pub fn strip_front_matter(text: &str) -> (usize, &str) {
    let mut lines = text.split('\n');
    let Some(first) = lines.next() else {
        return (0, text);
    };
    if first.trim_end() != "---" {
        return (0, text);
    }
    let mut offset = first.len() + 1;
    for (index, line) in lines.enumerate() {
        let end = offset + line.len();
        if line.trim_end() == "---" {
            let skipped = index + 2;
            let rest_start = (end + 1).min(text.len());
            return (skipped, &text[rest_start..]);
        }
        offset = end + 1;
    }
    (0, text)
}
