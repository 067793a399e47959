use crate::config::{Config, Refresh};
use crate::executor::Editor;
use crate::matcher::match_query;
use crate::model::{ProjectBookmark, RecentLists, ResultItem};
use crate::sources::worktree::{self, GitTool};
use crate::sources::{ProjectSource, RecentSource};
use log::{info, warn};
use std::collections::HashMap;
use std::path::Path;

/// Everything a query needs, loaded from the sources and kept until the next refresh.
pub struct Session {
    pub config: Config,
    pub editor: Editor,
    pub projects: Vec<ProjectBookmark>,
    pub recent: RecentLists,
    recent_source: Box<dyn RecentSource>,
    project_source: Box<dyn ProjectSource>,
    git: Box<dyn GitTool>,
    /// Worktree expansion per bookmark, kept until `refresh` or `reconfigure`.
    worktrees: HashMap<ProjectBookmark, Vec<ProjectBookmark>>,
}

impl Session {
    pub fn new(
        config: Config,
        editor: Editor,
        recent_source: Box<dyn RecentSource>,
        project_source: Box<dyn ProjectSource>,
        git: Box<dyn GitTool>,
    ) -> Self {
        let mut session = Self {
            config,
            editor,
            projects: Vec::new(),
            recent: RecentLists::default(),
            recent_source,
            project_source,
            git,
            worktrees: HashMap::new(),
        };
        session.refresh();
        session
    }

    /// Rebuilds the cached lists from scratch, worktrees included.
    pub fn refresh(&mut self) {
        self.worktrees.clear();
        self.reload();
    }

    /// Re-reads the recent and project documents. Bookmarks expanded before
    /// reuse their worktrees; only bookmarks not seen yet run git.
    fn reload(&mut self) {
        self.recent = match self.recent_source.read_recent() {
            Ok(lists) => lists,
            Err(e) => {
                warn!("Could not read recent items: {}", e);
                RecentLists::default()
            }
        };

        let projects = self.project_source.read_projects();
        self.projects = if self.config.worktrees.extract {
            let template = &self.config.worktrees.name_template;
            let git = self.git.as_ref();
            let mut expanded = Vec::new();
            for project in projects {
                let worktrees = self
                    .worktrees
                    .entry(project)
                    .or_insert_with_key(|project| worktree::expand(project, git, template));
                expanded.extend(worktrees.iter().cloned());
            }
            expanded
        } else {
            projects
        };

        info!(
            "Session: {} projects, {} recent entries",
            self.projects.len(),
            self.recent.files.len() + self.recent.folders.len() + self.recent.workspaces.len()
        );
    }

    /// Swaps in a new configuration and reloads.
    #[allow(dead_code)]
    pub fn reconfigure(&mut self, config: Config) {
        self.config = config;
        self.refresh();
    }

    pub fn query(&mut self, text: &str) -> Vec<ResultItem> {
        if self.config.general.refresh == Refresh::Query {
            self.reload();
        }
        match_query(
            text,
            &self.projects,
            &self.recent,
            &self.editor,
            self.config.general.max_items,
            &|path: &Path| path.exists(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GitError, SourceError};
    use crate::model::ResultKind;
    use std::cell::Cell;
    use std::fs;
    use std::path::PathBuf;
    use std::rc::Rc;

    struct CountingRecent {
        lists: Option<RecentLists>,
        reads: Rc<Cell<usize>>,
    }

    impl RecentSource for CountingRecent {
        fn read_recent(&self) -> Result<RecentLists, SourceError> {
            self.reads.set(self.reads.get() + 1);
            self.lists
                .clone()
                .ok_or_else(|| SourceError::Malformed("lastKnownMenubarData".to_string()))
        }
    }

    struct FixedProjects(Vec<ProjectBookmark>);

    impl ProjectSource for FixedProjects {
        fn read_projects(&self) -> Vec<ProjectBookmark> {
            self.0.clone()
        }
    }

    struct FixedGit {
        output: &'static str,
        calls: Rc<Cell<usize>>,
    }

    impl GitTool for FixedGit {
        fn list_worktrees(&self, _root: &Path) -> Result<String, GitError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.output.to_string())
        }
    }

    fn editor() -> Editor {
        Editor {
            name: "Visual Studio Code".to_string(),
            executable: Some(PathBuf::from("/usr/bin/code")),
        }
    }

    fn session_with_git(
        config: Config,
        lists: Option<RecentLists>,
        projects: Vec<ProjectBookmark>,
    ) -> (Session, Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let reads = Rc::new(Cell::new(0));
        let git_calls = Rc::new(Cell::new(0));
        let recent = CountingRecent { lists, reads: reads.clone() };
        let git = FixedGit {
            output: "/wt/main abc [main]\n/wt/topic def [topic]\n",
            calls: git_calls.clone(),
        };
        let session = Session::new(
            config,
            editor(),
            Box::new(recent),
            Box::new(FixedProjects(projects)),
            Box::new(git),
        );
        (session, reads, git_calls)
    }

    fn session(config: Config, lists: Option<RecentLists>, projects: Vec<ProjectBookmark>) -> (Session, Rc<Cell<usize>>) {
        let (session, reads, _) = session_with_git(config, lists, projects);
        (session, reads)
    }

    fn git_checkout() -> (tempfile::TempDir, String) {
        let repo = tempfile::tempdir().unwrap();
        fs::create_dir(repo.path().join(".git")).unwrap();
        let root = repo.path().to_string_lossy().into_owned();
        (repo, root)
    }

    fn extracting(refresh: Refresh) -> Config {
        let mut config = Config::default();
        config.general.refresh = refresh;
        config.worktrees.extract = true;
        config.worktrees.name_template = "{name}:{branch}".to_string();
        config
    }

    #[test]
    fn reads_sources_once_per_session() {
        let (mut session, reads) = session(Config::default(), Some(RecentLists::default()), vec![]);
        session.query("a");
        session.query("ab");
        assert_eq!(reads.get(), 1);

        session.refresh();
        assert_eq!(reads.get(), 2);
    }

    #[test]
    fn query_cadence_rereads_every_time() {
        let mut config = Config::default();
        config.general.refresh = Refresh::Query;
        let (mut session, reads) = session(config, Some(RecentLists::default()), vec![]);
        session.query("a");
        session.query("ab");
        assert_eq!(reads.get(), 3);
    }

    #[test]
    fn unreadable_recent_document_degrades_to_not_found() {
        let (mut session, _) = session(Config::default(), None, vec![]);
        let items = session.query("anything");
        assert_eq!(items.last().map(|i| i.kind), Some(ResultKind::NotFound));
    }

    #[test]
    fn expands_worktrees_when_enabled() {
        let (_repo, root) = git_checkout();
        let projects = vec![
            ProjectBookmark::new("Repo", &root),
            ProjectBookmark { enabled: false, ..ProjectBookmark::new("Off", &root) },
        ];

        let (session_off, _) = session(Config::default(), None, projects.clone());
        assert_eq!(session_off.projects, projects);

        let (session_on, _) = session(extracting(Refresh::Session), None, projects);
        let names: Vec<_> = session_on.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Repo:main", "Repo:topic", "Off"]);
    }

    #[test]
    fn reconfigure_applies_new_cap() {
        let lists = RecentLists {
            files: vec!["/".to_string(); 10],
            ..Default::default()
        };
        let (mut session, reads) = session(Config::default(), Some(lists), vec![]);
        assert_eq!(session.query("").len(), 11);

        let mut config = Config::default();
        config.general.max_items = 4;
        session.reconfigure(config);
        assert_eq!(session.query("").len(), 4);
        assert_eq!(reads.get(), 2);
    }

    #[test]
    fn query_cadence_does_not_rerun_git() {
        let (_repo, root) = git_checkout();
        let projects = vec![ProjectBookmark::new("Repo", &root)];
        let (mut session, reads, git_calls) =
            session_with_git(extracting(Refresh::Query), Some(RecentLists::default()), projects);

        for query in ["r", "re", "rep", "repo"] {
            session.query(query);
        }
        assert_eq!(reads.get(), 5);
        assert_eq!(git_calls.get(), 1);
        let names: Vec<_> = session.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Repo:main", "Repo:topic"]);
    }

    #[test]
    fn explicit_refresh_and_reconfigure_rerun_git() {
        let (_repo, root) = git_checkout();
        let projects = vec![ProjectBookmark::new("Repo", &root)];
        let (mut session, _, git_calls) =
            session_with_git(extracting(Refresh::Session), None, projects);
        session.query("repo");
        assert_eq!(git_calls.get(), 1);

        session.refresh();
        assert_eq!(git_calls.get(), 2);

        session.reconfigure(extracting(Refresh::Query));
        assert_eq!(git_calls.get(), 3);
        session.query("repo");
        assert_eq!(git_calls.get(), 3);
    }
}
