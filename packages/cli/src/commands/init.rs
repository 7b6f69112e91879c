use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

const EXAMPLE_VALUE: &str = r#"{
  "object": "value",
  "document": {
    "object": "document",
    "nodes": [
      {
        "object": "block",
        "type": "paragraph",
        "nodes": [
          {
            "object": "text",
            "leaves": [
              { "text": "Hello ", "marks": [] },
              { "text": "world", "marks": [{ "type": "bold" }] }
            ]
          }
        ]
      }
    ]
  }
}
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Keep node keys when printing values
    #[arg(long)]
    pub preserve_keys: bool,

    /// Namespace seeding generated keys
    #[arg(short, long)]
    pub key_namespace: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Folio project...".bright_blue().bold());

    let mut config = Config {
        preserve_keys: args.preserve_keys,
        ..Config::default()
    };
    if let Some(namespace) = args.key_namespace {
        config.key_namespace = namespace;
    }
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    let example_file = PathBuf::from(cwd).join("example.value.json");
    if !example_file.exists() {
        fs::write(&example_file, EXAMPLE_VALUE)?;
        println!("  {} Created example.value.json", "✓".green());
    }

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: folio check example.value.json");
    println!("  2. Write an operation log and run: folio apply example.value.json ops.json");

    Ok(())
}
