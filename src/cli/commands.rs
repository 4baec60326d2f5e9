//! Command dispatch

use std::io;
use std::sync::Arc;

use clap::CommandFactory;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::services::SortReport;
use crate::application::IoResultExt;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output::{self, TerminalObserver};
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{visual_width, NodeId, NodeKind};
use crate::infrastructure::chrome::ChromeBookmarksFile;
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::BookmarkStore;

/// What a sort-like command operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortTarget {
    /// Every top-level root of the bookmarks file
    Roots,
    /// One folder, or the parent folder of a bookmark
    Node(NodeId),
}

/// Root flags of the `sort` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootFlags {
    pub bar: bool,
    pub other: bool,
    pub synced: bool,
}

/// Pick the sort target from the `sort` arguments.
pub fn resolve_target(settings: &Settings, id: Option<&str>, flags: RootFlags) -> SortTarget {
    let roots = &settings.roots;
    match id {
        Some(id) => SortTarget::Node(NodeId::from(id)),
        None if flags.bar => SortTarget::Node(NodeId::from(roots.bar.as_str())),
        None if flags.other => SortTarget::Node(NodeId::from(roots.other.as_str())),
        None if flags.synced => SortTarget::Node(NodeId::from(roots.synced.as_str())),
        None => SortTarget::Roots,
    }
}

pub fn execute(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Sort {
            id,
            bar,
            other,
            synced,
            dry_run,
            no_backup,
        }) => {
            let flags = RootFlags {
                bar: *bar,
                other: *other,
                synced: *synced,
            };
            cmd_sort(cli, id.as_deref(), flags, *dry_run, *no_backup)
        }
        Some(Commands::Plan { id }) => cmd_plan(cli, id.as_deref()),
        Some(Commands::Tree { id, bookmarks }) => cmd_tree(cli, id.as_deref(), *bookmarks),
        Some(Commands::Width { text }) => cmd_width(text),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "bmsort", &mut io::stdout());
            Ok(())
        }
        None => Cli::command()
            .print_help()
            .map_err(|e| CliError::Usage(format!("cannot print help: {e}"))),
    }
}

/// Settings with the `--file` override applied.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(file) = &cli.file {
        settings.bookmarks_file = file.clone();
    }
    debug!("bookmarks file: {}", settings.bookmarks_file.display());
    Ok(settings)
}

fn container(cli: &Cli) -> CliResult<ServiceContainer> {
    let settings = load_settings(cli)?;
    let observer = Arc::new(TerminalObserver::new(cli.verbose));
    Ok(ServiceContainer::new(settings, observer)?)
}

fn run_sort(
    container: &ServiceContainer,
    target: &SortTarget,
    dry_run: bool,
) -> CliResult<SortReport> {
    let service = container.sort_service(dry_run);
    let report = match target {
        SortTarget::Roots => service.sort_all()?,
        SortTarget::Node(id) => service.sort_one(id)?,
    };
    Ok(report)
}

#[instrument(skip(cli))]
fn cmd_sort(
    cli: &Cli,
    id: Option<&str>,
    flags: RootFlags,
    dry_run: bool,
    no_backup: bool,
) -> CliResult<()> {
    let container = container(cli)?;
    let target = resolve_target(&container.settings, id, flags);
    let report = run_sort(&container, &target, dry_run)?;

    if dry_run {
        output::info("Dry run, file not written.");
        return Ok(());
    }
    if report.move_count() == 0 {
        output::info("Already sorted, file not written.");
        return Ok(());
    }

    let backup = container.settings.backup && !no_backup;
    if let Some(path) = container.bookmarks.save(backup)? {
        output::action("Backup", &path.display());
    }
    output::action("Written", &container.bookmarks.path().display());
    output::warning("Close the browser before sorting, or it will overwrite the file on exit.");
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_plan(cli: &Cli, id: Option<&str>) -> CliResult<()> {
    let container = container(cli)?;
    let target = match id {
        Some(id) => SortTarget::Node(NodeId::from(id)),
        None => SortTarget::Roots,
    };
    let report = run_sort(&container, &target, true)?;

    for folder in report.folders.iter().filter(|f| !f.plan.moves.is_empty()) {
        output::header(&format!(
            "{}{} [{}]",
            "  ".repeat(folder.depth),
            folder.name,
            folder.id
        ));
        for mv in &folder.plan.moves {
            let title = folder
                .plan
                .bookmarks
                .iter()
                .find(|b| b.id == mv.node_id)
                .map(|b| format!("{} (width {})", b.normalized_title, b.visual_width))
                .or_else(|| {
                    folder
                        .plan
                        .folders
                        .iter()
                        .find(|f| f.id == mv.node_id)
                        .map(|f| format!("{}/", f.normalized_title))
                })
                .unwrap_or_else(|| mv.node_id.to_string());
            let indent = "  ".repeat(folder.depth);
            output::detail(&format!("{indent}→ {:>3}  {title}", mv.index));
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, id: Option<&str>, bookmarks: bool) -> CliResult<()> {
    let settings = load_settings(cli)?;
    let file = ChromeBookmarksFile::load(&settings.bookmarks_file)?;
    let roots = match id {
        Some(id) => vec![NodeId::from(id)],
        None => file.root_ids(),
    };
    for root in roots {
        let node = file.get_node(&root).or_not_found("get node", &root)?;
        let tree = build_tree(&file, &root, &node.title, bookmarks, 0, settings.max_depth)?;
        output::info(&tree);
    }
    Ok(())
}

fn build_tree(
    store: &dyn BookmarkStore,
    folder_id: &NodeId,
    name: &str,
    bookmarks: bool,
    depth: usize,
    max_depth: usize,
) -> CliResult<Tree<String>> {
    let children = store
        .get_children(folder_id)
        .with_node_context("get children", folder_id)?;
    let bookmark_count = children.iter().filter(|n| !n.is_folder()).count();
    let mut tree = Tree::new(format!("{} ({} bookmarks)", name, bookmark_count));
    if depth >= max_depth {
        return Ok(tree);
    }
    for child in &children {
        match &child.kind {
            NodeKind::Bookmark { url } if bookmarks => {
                let title = crate::domain::ordering::normalized_bookmark_title(&child.title, url);
                tree.push(Tree::new(format!("[{}] {}", visual_width(&title), title)));
            }
            NodeKind::Bookmark { .. } => {}
            NodeKind::Folder => {
                tree.push(build_tree(
                    store,
                    &child.id,
                    &child.title,
                    bookmarks,
                    depth + 1,
                    max_depth,
                )?);
            }
        }
    }
    Ok(tree)
}

fn cmd_width(texts: &[String]) -> CliResult<()> {
    for text in texts {
        output::info(&format!("{}\t{}", visual_width(text), text));
    }
    Ok(())
}

fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => {
                return Err(CliError::Usage(
                    "cannot determine config directory".to_string(),
                ))
            }
        },
        ConfigCommands::Template => output::info(&Settings::template()),
    }
    Ok(())
}
