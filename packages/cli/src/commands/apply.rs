use super::{input_path, read_value};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::{Editor, Operation};
use folio_model::SerializeOptions;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Value JSON file
    pub value: PathBuf,

    /// Operation log: a JSON array of operations
    pub operations: PathBuf,

    /// Keep node keys in the output (overrides config)
    #[arg(long)]
    pub preserve_keys: bool,

    /// Include the selection in the output
    #[arg(long)]
    pub preserve_selection: bool,

    /// Undo this many steps after applying
    #[arg(long, default_value_t = 0)]
    pub undo: usize,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let value = read_value(&input_path(cwd, &args.value))?;

    let ops_path = input_path(cwd, &args.operations);
    let content =
        std::fs::read_to_string(&ops_path).with_context(|| format!("Failed to read {}", ops_path.display()))?;
    let operations: Vec<Operation> =
        serde_json::from_str(&content).with_context(|| format!("Invalid operation log in {}", ops_path.display()))?;

    let count = operations.len();
    let mut editor = Editor::with_config(value, config.editor_config());
    for (index, operation) in operations.into_iter().enumerate() {
        let name = operation.name();
        editor
            .apply(operation)
            .with_context(|| format!("Operation #{index} ({name}) was rejected"))?;
    }
    info!(count, version = editor.value().version(), "Applied operation log");

    let mut undone = 0;
    while undone < args.undo && editor.undo()? {
        undone += 1;
    }

    let options = SerializeOptions {
        preserve_keys: args.preserve_keys || config.preserve_keys,
        preserve_selection: args.preserve_selection,
    };
    let output = editor.value().to_json_value(options)?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    eprintln!(
        "{} Applied {} operations, undid {} (version {})",
        "✓".green(),
        count,
        undone,
        editor.value().version()
    );
    Ok(())
}
