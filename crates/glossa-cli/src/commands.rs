use anyhow::{Context, Result, bail};
use glossa_core::{DefinitionDraft, GlossaEngine, ScopePath};
use serde_json::json;

use crate::cli::{Command, EventCommand};

pub fn run_from_root(root: &str, command: Command) -> Result<()> {
    let mut engine = GlossaEngine::open(root).context("open engine")?;
    engine.bootstrap().context("bootstrap index")?;
    run(&mut engine, command)
}

fn run(engine: &mut GlossaEngine, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            let status = engine.status();
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Command::List { scope } => {
            let scope = parse_scope(&scope)?;
            let defs = engine.definitions(&scope);
            let rows: Vec<_> = defs
                .iter()
                .map(|def| {
                    json!({
                        "key": def.key,
                        "word": def.word,
                        "aliases": def.aliases,
                        "source": def.source.path,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Command::Lookup { key, scope } => {
            let scope = parse_scope(&scope)?;
            let Some(def) = engine.lookup(&key, &scope) else {
                bail!("no definition for '{key}' at scope {scope}");
            };
            println!("{}", serde_json::to_string_pretty(def.as_ref())?);
        }
        Command::Scan { path } => {
            let matches = engine.scan_document(&path).context("scan document")?;
            println!("{}", serde_json::to_string_pretty(&matches)?);
        }
        Command::Add {
            word,
            aliases,
            contents,
            scope,
        } => {
            let scope = parse_scope(&scope)?;
            let draft = DefinitionDraft {
                word: word.clone(),
                aliases,
                contents,
            };
            engine
                .add_definition(&draft, &scope)
                .context("add definition")?;
            println!("added '{word}' at scope {scope}");
        }
        Command::Edit {
            key,
            aliases,
            contents,
            scope,
        } => {
            let scope = parse_scope(&scope)?;
            engine
                .edit_definition(&key, &scope, aliases, contents)
                .context("edit definition")?;
            println!("edited '{key}'");
        }
        Command::Event { event } => {
            match event {
                EventCommand::Created { path } => engine.document_created(&path)?,
                EventCommand::Modified { path } => engine.document_modified(&path)?,
                EventCommand::Deleted { path } => engine.document_deleted(&path)?,
                EventCommand::Renamed { path, from } => {
                    engine.document_renamed(&path, &from)?;
                }
            }
            println!("event applied");
        }
        Command::Events => {
            for event in engine.events().context("read event log")? {
                println!("{}", serde_json::to_string(&event)?);
            }
        }
    }
    Ok(())
}

fn parse_scope(raw: &str) -> Result<ScopePath> {
    ScopePath::parse(raw).with_context(|| format!("invalid scope: {raw}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glossa_core::EngineConfig;

    #[test]
    fn commands_run_against_a_real_tree() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("glossary.md"),
            "# API\n\nA contract.\n\n---\n",
        )
        .expect("write");
        let mut engine =
            GlossaEngine::new(dir.path(), EngineConfig::default()).expect("engine");
        engine.bootstrap().expect("bootstrap");

        run(&mut engine, Command::Status).expect("status");
        run(
            &mut engine,
            Command::Lookup {
                key: "api".to_string(),
                scope: "/".to_string(),
            },
        )
        .expect("lookup");
        run(
            &mut engine,
            Command::List {
                scope: "/".to_string(),
            },
        )
        .expect("list");
    }

    #[test]
    fn lookup_miss_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut engine =
            GlossaEngine::new(dir.path(), EngineConfig::default()).expect("engine");
        engine.bootstrap().expect("bootstrap");
        let err = run(
            &mut engine,
            Command::Lookup {
                key: "missing".to_string(),
                scope: "/".to_string(),
            },
        )
        .expect_err("must fail");
        assert!(err.to_string().contains("missing"));
    }
}
