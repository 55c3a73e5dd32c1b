use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "glossa",
    version,
    about = "Scoped glossary index and phrase matcher for document trees"
)]
pub struct Cli {
    /// Root directory of the document tree.
    #[arg(long, default_value = ".")]
    pub root: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize the index: registrations, scopes, definition count.
    Status,

    /// List every definition visible at a scope.
    List {
        #[arg(long, default_value = "/")]
        scope: String,
    },

    /// Look up the definition for one key.
    Lookup {
        key: String,
        #[arg(long, default_value = "/")]
        scope: String,
    },

    /// Annotate a document with the glossary phrases it contains.
    Scan {
        /// Tree-relative document path; scanned against its own scope.
        path: String,
    },

    /// Append a new definition to the glossary document of a scope.
    Add {
        word: String,
        #[arg(long, value_delimiter = ',')]
        aliases: Vec<String>,
        #[arg(long)]
        contents: String,
        #[arg(long, default_value = "/")]
        scope: String,
    },

    /// Rewrite the aliases and body of an existing definition.
    Edit {
        key: String,
        #[arg(long, value_delimiter = ',')]
        aliases: Vec<String>,
        #[arg(long)]
        contents: String,
        #[arg(long, default_value = "/")]
        scope: String,
    },

    /// Replay a document change notification against the index.
    Event {
        #[command(subcommand)]
        event: EventCommand,
    },

    /// Print the recorded index event log.
    Events,
}

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    Created { path: String },
    Modified { path: String },
    Deleted { path: String },
    Renamed {
        path: String,
        /// Previous tree-relative path of the document.
        #[arg(long)]
        from: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lookup_with_scope() {
        let cli = Cli::try_parse_from([
            "glossa", "--root", "/tmp/tree", "lookup", "api", "--scope", "docs",
        ])
        .expect("parse");
        assert_eq!(cli.root, "/tmp/tree");
        match cli.command {
            Command::Lookup { key, scope } => {
                assert_eq!(key, "api");
                assert_eq!(scope, "docs");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_splits_aliases_on_commas() {
        let cli = Cli::try_parse_from([
            "glossa",
            "add",
            "API",
            "--aliases",
            "interface,contract",
            "--contents",
            "body",
        ])
        .expect("parse");
        match cli.command {
            Command::Add { aliases, scope, .. } => {
                assert_eq!(aliases, ["interface", "contract"]);
                assert_eq!(scope, "/");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn renamed_event_requires_the_old_path() {
        let cli = Cli::try_parse_from([
            "glossa",
            "event",
            "renamed",
            "archive/glossary.md",
            "--from",
            "docs/glossary.md",
        ])
        .expect("parse");
        match cli.command {
            Command::Event {
                event: EventCommand::Renamed { path, from },
            } => {
                assert_eq!(path, "archive/glossary.md");
                assert_eq!(from, "docs/glossary.md");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
