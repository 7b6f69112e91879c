mod commands;
mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, check, init, resolve, ApplyArgs, CheckArgs, InitArgs, ResolveArgs};

/// Folio CLI - inspect and edit rich-text documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a folio.config.json and an example value
    Init(InitArgs),

    /// Apply an operation log to a value and print the result
    Apply(ApplyArgs),

    /// Report node counts and invariant status of a value
    Check(CheckArgs),

    /// Resolve a caret on a rendered surface to a model point
    Resolve(ResolveArgs),
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()
        .context("Cannot get current directory")?
        .display()
        .to_string();

    match cli.command {
        Command::Init(args) => init(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
        Command::Check(args) => check(args, &cwd),
        Command::Resolve(args) => resolve(args, &cwd),
    }
}

fn main() {
    // Logs go to stderr so printed values stay pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
