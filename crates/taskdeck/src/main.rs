//! CLI entry point for taskdeck.

use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use taskdeck_app::{ProjectConfig, open_service};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Personal tasks with dated progress logs, kept in a local JSON file.
#[derive(Parser, Debug)]
#[command(
    name = "taskdeck",
    version,
    about = "taskdeck: prioritised tasks with dated progress logs"
)]
struct Cli {
    /// Directory holding taskdeck.toml and the save file (defaults to current).
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Save file to use instead of the configured one.
    #[arg(long)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a task. An existing task with the same name is replaced unless
    /// the configuration rejects name conflicts.
    New {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: String,
        /// High, Medium or Low (any case).
        #[arg(short, long)]
        priority: String,
    },

    /// List tasks by priority.
    Ls {
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show one task with its logs.
    Show {
        name: String,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Change the name, description or priority of a task.
    Edit {
        name: String,
        #[arg(long)]
        rename: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        priority: Option<String>,
    },

    /// Delete a task and all of its logs.
    Rm { name: String },

    /// Work with a task's progress logs.
    Log {
        #[command(subcommand)]
        cmd: LogCommand,
    },
}

#[derive(Subcommand, Debug)]
enum LogCommand {
    /// Append a dated entry.
    Add {
        name: String,
        text: String,
        /// Entry date as YYYY-MM-DD (defaults to today).
        #[arg(long)]
        date: Option<String>,
    },

    /// Replace the text of an entry, keeping its date.
    Edit {
        name: String,
        /// Position as shown by `show`, starting at 1.
        index: NonZeroUsize,
        text: String,
    },

    /// Replace an entry wholesale with "YYYY-MM-DD: text".
    Replace {
        name: String,
        /// Position as shown by `show`, starting at 1.
        index: NonZeroUsize,
        entry: String,
    },

    /// Remove an entry.
    Rm {
        name: String,
        /// Position as shown by `show`, starting at 1.
        index: NonZeroUsize,
    },
}

fn main() -> Result<()> {
    let Cli { dir, file, cmd } = Cli::parse();
    install_tracing();

    let config = load_config(dir, file)?;
    debug!(path = %config.save_path().display(), "Using save file");
    let mut service = open_service(&config)?;
    commands::run(cmd, &mut service, &mut io::stdout().lock())
}

fn load_config(dir: Option<PathBuf>, file: Option<PathBuf>) -> Result<ProjectConfig> {
    let workdir = dir.unwrap_or_else(|| PathBuf::from("."));
    let config = ProjectConfig::from_workdir(&workdir)?;
    Ok(match file {
        Some(file) => config.with_save_file(file),
        None => config,
    })
}

fn install_tracing() {
    // RUST_LOG overrides; default keeps command output uncluttered.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}
