mod abbrev;
mod config;
mod error;
mod executor;
mod matcher;
mod model;
mod sources;
mod state;

use anyhow::Result;
use clap::Parser;
use crate::config::{load_config, Mode, Refresh};
use crate::error::LaunchError;
use crate::executor::{DetachedLauncher, Editor, LaunchSink};
use crate::model::ResultItem;
use crate::sources::{projects::ProjectsFileSource, recent::StorageFileSource, worktree::GitCommand};
use crate::state::Session;

#[derive(Parser, Debug)]
#[command(author, version, about = "Search and open recent editor files, folders and projects", long_about = None)]
struct Args {
    /// Filter text; `file` or `folder` narrows recent entries, project tags narrow projects
    query: Vec<String>,

    /// Editor variant, overrides the config file
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Maximum number of rows
    #[arg(long)]
    max_items: Option<usize>,

    /// When to re-read the editor's history
    #[arg(long, value_enum)]
    refresh: Option<Refresh>,

    /// Open the N-th row (1-based)
    #[arg(short, long)]
    pick: Option<usize>,

    /// Print rows as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Load Config
    let mut config = load_config()?;
    if let Some(mode) = args.mode {
        config.general.mode = mode;
    }
    if let Some(max_items) = args.max_items {
        config.general.max_items = max_items;
    }
    if let Some(refresh) = args.refresh {
        config.general.refresh = refresh;
    }
    config.validate()?;

    // 2. Locate the editor and build the session cache
    let mode = config.general.mode;
    let editor = Editor::locate(
        mode.display_name(),
        mode.executable_name(),
        config.general.executable.as_deref(),
    );
    let recent_source = StorageFileSource { path: config.storage_path() };
    let project_source = ProjectsFileSource { path: config.projects_path() };
    let git = GitCommand { executable: config.worktrees.git.clone() };
    let mut session = Session::new(
        config,
        editor,
        Box::new(recent_source),
        Box::new(project_source),
        Box::new(git),
    );

    // 3. Query
    let items = session.query(&args.query.join(" "));

    // 4. Launch or print
    if let Some(pick) = args.pick {
        launch(&items, pick, &DetachedLauncher)?;
        return Ok(());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for (i, item) in items.iter().enumerate() {
            if item.subtext.is_empty() {
                println!("{:>2}. {}", i + 1, item.label);
            } else {
                println!("{:>2}. {}  ({})", i + 1, item.label, item.subtext);
            }
        }
    }
    Ok(())
}

fn launch(items: &[ResultItem], pick: usize, sink: &dyn LaunchSink) -> Result<(), LaunchError> {
    let item = pick
        .checked_sub(1)
        .and_then(|index| items.get(index))
        .ok_or(LaunchError::OutOfRange(pick))?;
    let command = item.command.as_ref().ok_or(LaunchError::NoAction(pick))?;
    sink.launch(command)
}
