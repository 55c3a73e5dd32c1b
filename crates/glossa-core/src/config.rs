const ENV_DEF_FILE: &str = "GLOSSA_DEF_FILE";
const ENV_EVENT_LOG: &str = "GLOSSA_EVENT_LOG";

pub(crate) const DEFAULT_GLOSSARY_FILE: &str = "glossary.md";

/// Engine configuration, environment-driven with an injectable value for
/// tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// File name (glob) identifying glossary documents in the tree.
    pub glossary_file_name: String,
    /// Append index events to `<root>/.glossa/events.jsonl`.
    pub event_log_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            glossary_file_name: DEFAULT_GLOSSARY_FILE.to_string(),
            event_log_enabled: false,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            glossary_file_name: read_non_empty_env(ENV_DEF_FILE)
                .unwrap_or_else(|| DEFAULT_GLOSSARY_FILE.to_string()),
            event_log_enabled: parse_enabled(
                std::env::var(ENV_EVENT_LOG).ok().as_deref(),
            ),
        }
    }
}

#[must_use]
fn read_non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[must_use]
fn parse_enabled(raw: Option<&str>) -> bool {
    matches!(
        raw.map(|value| value.trim().to_ascii_lowercase())
            .as_deref(),
        Some("on" | "1" | "true" | "yes")
    )
}
