//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Recursive bookmark sorter: bookmarks by visual length, folders by name, bookmarks first
#[derive(Parser, Debug)]
#[command(name = "bmsort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show per-folder progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log level: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Config file, layered over the global config
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Bookmarks file (default: from config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sort every top-level root, one root, or the folder containing ID
    Sort {
        /// Folder or bookmark id (a bookmark sorts its parent folder)
        #[arg(conflicts_with_all = ["bar", "other", "synced"])]
        id: Option<String>,
        /// Sort only the bookmarks bar
        #[arg(long, conflicts_with_all = ["other", "synced"])]
        bar: bool,
        /// Sort only "Other bookmarks"
        #[arg(long, conflicts_with = "synced")]
        other: bool,
        /// Sort only mobile bookmarks
        #[arg(long)]
        synced: bool,
        /// Plan without writing the file
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Do not back up the bookmarks file before writing
        #[arg(long)]
        no_backup: bool,
    },

    /// Show planned moves per folder without applying them
    Plan {
        /// Folder or bookmark id (default: every top-level root)
        id: Option<String>,
    },

    /// Show the folder tree
    Tree {
        /// Folder id (default: every top-level root)
        id: Option<String>,
        /// Include bookmarks with their visual width
        #[arg(short, long)]
        bookmarks: bool,
    },

    /// Print the visual width of each text
    Width {
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show global config file location
    Path,
    /// Print a commented config template
    Template,
}
