use super::{input_path, read_value};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use folio_surface::{find_point, ResolveOptions, Surface, SurfaceNode};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct ResolveArgs {
    /// Value JSON file the surface was rendered from
    pub value: PathBuf,

    /// Rendered surface JSON file
    pub surface: PathBuf,

    /// Dotted child-index path of the caret node, e.g. 0.1.0
    #[arg(long, default_value = "")]
    pub node: String,

    /// Caret offset within the node
    #[arg(long)]
    pub offset: usize,

    /// An input method is composing
    #[arg(long)]
    pub composing: bool,
}

pub fn resolve(args: ResolveArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let value = read_value(&input_path(cwd, &args.value))?;

    let surface_path = input_path(cwd, &args.surface);
    let content = std::fs::read_to_string(&surface_path)
        .with_context(|| format!("Failed to read {}", surface_path.display()))?;
    let root: SurfaceNode = serde_json::from_str(&content)
        .with_context(|| format!("Invalid surface in {}", surface_path.display()))?;
    let surface = Surface::build(&root);
    let node = surface.resolve_path(&args.node)?;

    let options = ResolveOptions::default()
        .composing(args.composing)
        .with_markers(config.markers);
    let point = find_point(&surface, node, args.offset, &value, &options);
    println!("{}", serde_json::to_string(&point)?);
    Ok(())
}
