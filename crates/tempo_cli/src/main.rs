//! tempo CLI
//!
//! Command-line surface of the tempo time tracker.
//!
//! # Commands
//!
//! - `start` / `stop` / `cancel` / `status` - session lifecycle
//! - `projects` / `tags` - views over the recorded frames
//! - `sync` - pull and push frames against the configured backend
//! - `merge` - compare a recovered frame file against the local store

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tempo_core::Storage;
use tracing_subscriber::EnvFilter;

/// tempo time tracker.
#[derive(Parser)]
#[command(name = "tempo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Application directory (defaults to the platform config dir)
    #[arg(global = true, short, long)]
    dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start tracking a project
    Start {
        /// Project name
        project: String,

        /// Tags to attach to the resulting frame
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// Stop the running project and record a frame
    Stop,

    /// Discard the running project without recording anything
    Cancel,

    /// Show what is currently being tracked
    Status,

    /// List all recorded projects
    Projects,

    /// List all recorded tags
    Tags,

    /// Pull and push frames against the configured backend
    Sync,

    /// Compare a recovered frame file against the local store and
    /// merge the frames that do not conflict
    Merge {
        /// File holding the frames to compare
        file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let storage = Storage::open(cli.dir)?;
    tracing::debug!(dir = %storage.dir().display(), "storage opened");

    match cli.command {
        Commands::Start { project, tags } => commands::start(&storage, project, tags)?,
        Commands::Stop => commands::stop(&storage)?,
        Commands::Cancel => commands::cancel(&storage)?,
        Commands::Status => commands::status(&storage)?,
        Commands::Projects => commands::projects(&storage)?,
        Commands::Tags => commands::tags(&storage)?,
        Commands::Sync => commands::sync(&storage)?,
        Commands::Merge { file } => commands::merge(&storage, &file)?,
    }

    Ok(())
}
