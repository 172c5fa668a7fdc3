use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "archivist")]
#[command(author, version, about = "Media library manager")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a directory for media files, reusing unmodified library entries
    Scan {
        /// Directory to scan
        #[arg(required = true)]
        directory: PathBuf,

        /// Re-probe every file, ignoring the stored library
        #[arg(long)]
        full: bool,

        /// Override the configured number of probe workers
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Probe a media file and display information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rename a media file along with its subtitle files
    Rename {
        /// Current path
        #[arg(required = true)]
        old_path: PathBuf,

        /// New path
        #[arg(required = true)]
        new_path: PathBuf,

        /// Rename only the media file, leaving subtitles alone
        #[arg(long)]
        no_subtitles: bool,
    },

    /// Move files into a directory
    Mv {
        /// Files to move
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Destination directory
        #[arg(long, required = true)]
        dest: PathBuf,
    },

    /// Delete files
    Rm {
        /// Files to delete
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also remove emptied parent folders
        #[arg(long)]
        delete_folders: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
