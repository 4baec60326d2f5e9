//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::infrastructure::traits::{FolderProgress, SortObserver, SortOutcome};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print failure status (red X)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✗".red(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Observer printing run progress to the terminal.
#[derive(Debug, Default)]
pub struct TerminalObserver {
    /// Print a line per visited folder
    pub verbose: bool,
}

impl TerminalObserver {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl SortObserver for TerminalObserver {
    fn on_folder(&self, progress: &FolderProgress) {
        if !self.verbose {
            return;
        }
        let name = if progress.folder_name.is_empty() {
            "(untitled)"
        } else {
            progress.folder_name.as_str()
        };
        detail(&format!(
            "{}{} {} ({} bookmarks, {} folders, {} moves)",
            "  ".repeat(progress.depth),
            "▸".cyan(),
            name,
            progress.bookmark_count,
            progress.folder_count,
            progress.moves
        ));
    }

    fn on_complete(&self, outcome: &SortOutcome) {
        if outcome.success {
            success(&format!("Sorted: {}", outcome.detail));
        } else {
            failure(&format!("Sort failed: {}", outcome.detail));
        }
    }
}
