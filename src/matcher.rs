use crate::abbrev::{abbreviate, DEFAULT_MAX_CHARS};
use crate::executor::Editor;
use crate::model::{
    LaunchCommand, PathRef, ProjectBookmark, RecentEntry, RecentKind, RecentLists, ResultItem,
    ResultKind, Scope,
};
use log::debug;
use std::collections::HashSet;
use std::path::Path;

pub const MAX_ITEMS: usize = 50;

const FOLDER_SCOPE: &str = "folder";
const FILE_SCOPE: &str = "file";

/// Splits a query into lower-cased, whitespace separated filter tokens.
pub fn tokenize(query: &str) -> Vec<String> {
    query.to_lowercase().split_whitespace().map(str::to_string).collect()
}

/// A project matches when every filter left after consuming its tags is
/// contained in its name. Tags compare case-insensitively as a set, and each
/// distinct tag consumes at most one matching filter.
pub fn project_matches(project: &ProjectBookmark, filters: &[String]) -> bool {
    let mut remaining = filters.to_vec();
    let mut seen = HashSet::new();
    for tag in &project.tags {
        let tag = tag.to_lowercase();
        if !seen.insert(tag.clone()) {
            continue;
        }
        if let Some(pos) = remaining.iter().position(|f| *f == tag) {
            remaining.remove(pos);
        }
    }
    let name = project.name.to_lowercase();
    remaining.iter().all(|f| name.contains(f.as_str()))
}

/// Removes the first scope keyword from `filters` and returns the pool it selects.
/// `folder` wins over `file` when both are typed.
pub fn take_scope(filters: &mut Vec<String>) -> Scope {
    for (keyword, scope) in [(FOLDER_SCOPE, Scope::Folders), (FILE_SCOPE, Scope::Files)] {
        if let Some(pos) = filters.iter().position(|f| f == keyword) {
            filters.remove(pos);
            return scope;
        }
    }
    Scope::All
}

/// Ranks projects and recent entries against `query`.
///
/// Order is fixed: the new-window row, matching projects, then matching
/// recent entries, each group in source order. At most `max_items` rows
/// are returned. `exists` is consulted for every local candidate.
pub fn match_query(
    query: &str,
    projects: &[ProjectBookmark],
    recent: &RecentLists,
    editor: &Editor,
    max_items: usize,
    exists: &dyn Fn(&Path) -> bool,
) -> Vec<ResultItem> {
    let executable = match &editor.executable {
        Some(executable) => executable,
        None => return vec![ResultItem::not_found(format!("{} not installed", editor.name))],
    };
    let rows = RowBuilder { executable, editor_name: &editor.name };

    debug!("query: '{}'", query);
    let filters = tokenize(query);

    let mut items = Vec::new();
    if max_items == 0 {
        return items;
    }
    items.push(rows.new_window());

    for project in projects.iter().filter(|p| p.enabled) {
        if items.len() >= max_items {
            return items;
        }
        if !project_matches(project, &filters) {
            continue;
        }
        let location = project.location();
        if !location.exists(exists) {
            debug!("skipping project {} with missing root {:?}", project.name, location);
            continue;
        }
        items.push(rows.project(project, &location));
    }

    if recent.is_empty() {
        if items.len() < max_items {
            items.push(ResultItem::not_found("Recent Files and Folders not found"));
        }
        return items;
    }

    let mut remaining = filters;
    let scope = take_scope(&mut remaining);

    for entry in recent.pool(scope) {
        if items.len() >= max_items {
            break;
        }
        let haystack = entry.path.to_lowercase();
        if !remaining.iter().all(|f| haystack.contains(f.as_str())) {
            continue;
        }
        if !PathRef::parse(&entry.path).exists(exists) {
            continue;
        }
        items.push(rows.recent(&entry));
    }

    debug!("query '{}' produced {} rows", query, items.len());
    items
}

struct RowBuilder<'a> {
    executable: &'a Path,
    editor_name: &'a str,
}

impl RowBuilder<'_> {
    fn command(&self, args: &[&str]) -> Option<LaunchCommand> {
        Some(LaunchCommand {
            executable: self.executable.to_path_buf(),
            args: args.iter().map(|a| a.to_string()).collect(),
        })
    }

    fn new_window(&self) -> ResultItem {
        ResultItem {
            label: "New Empty Window".to_string(),
            subtext: format!("Open new {} empty window", self.editor_name),
            kind: ResultKind::NewWindow,
            launch_path: String::new(),
            command: self.command(&["-n"]),
        }
    }

    fn project(&self, project: &ProjectBookmark, location: &PathRef) -> ResultItem {
        let uri = location.uri();
        ResultItem {
            label: project.name.clone(),
            subtext: abbreviate(&location.display(), DEFAULT_MAX_CHARS),
            kind: ResultKind::Project,
            command: self.command(&["--folder-uri", &uri]),
            launch_path: uri,
        }
    }

    fn recent(&self, entry: &RecentEntry) -> ResultItem {
        let uri = PathRef::parse(&entry.path).uri();
        let name = entry
            .path
            .rsplit('/')
            .find(|s| !s.is_empty())
            .unwrap_or(entry.path.as_str());

        let (prefix, flag) = match entry.kind {
            RecentKind::File => ("File", "--file-uri"),
            // Workspace files open through --file-uri, like any file.
            RecentKind::Workspace if entry.path.ends_with(".code-workspace") => ("Folder", "--file-uri"),
            RecentKind::Folder | RecentKind::Workspace => ("Folder", "--folder-uri"),
        };

        ResultItem {
            label: format!("{}: {}", prefix, name),
            subtext: abbreviate(&entry.path, DEFAULT_MAX_CHARS),
            kind: ResultKind::from(entry.kind),
            command: self.command(&[flag, &uri]),
            launch_path: uri,
        }
    }
}
