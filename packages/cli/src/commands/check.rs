use super::{input_path, read_value};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use folio_editor::normalization_op;
use folio_model::{KeyGenerator, NodeCounts, Value};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Value JSON file
    pub value: PathBuf,
}

pub fn check(args: CheckArgs, cwd: &str) -> Result<()> {
    let path = input_path(cwd, &args.value);
    let value = read_value(&path)?;
    let counts = NodeCounts::of(value.document());

    println!("{}", format!("🔍 {}", path.display()).bright_blue().bold());
    println!("  blocks:  {}", counts.blocks);
    println!("  inlines: {}", counts.inlines);
    println!("  texts:   {}", counts.texts);
    println!("  voids:   {}", counts.voids);
    println!("  leaves:  {}", counts.leaves);
    println!("  chars:   {}", value.document().len());
    println!();

    let problems = problems(&value);
    if problems.is_empty() {
        println!("{} Document is settled", "✅".green());
        return Ok(());
    }
    for problem in &problems {
        println!("  {} {}", "✗".red(), problem);
    }
    Err(anyhow!("{} invariant violation(s)", problems.len()))
}

/// Invariants a settled value holds beyond what construction enforces
pub(crate) fn problems(value: &Value) -> Vec<String> {
    let document = value.document();
    let mut problems = Vec::new();

    if !value.selection_is_valid() {
        problems.push("selection points outside the document".to_string());
    }
    for text in document.texts() {
        if !text.leaves().is_normalized() {
            problems.push(format!("text `{}` has unmerged leaves", text.key()));
        }
    }
    // Probe with a throwaway generator: only the kind of fix matters here
    let probe = KeyGenerator::from_seed("check".to_string());
    if let Some(op) = normalization_op(document, &probe) {
        problems.push(format!("document needs normalization ({})", op.name()));
    }
    problems
}
