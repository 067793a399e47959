use crate::error::GitError;
use crate::model::{PathRef, ProjectBookmark};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const DEFAULT_NAME_TEMPLATE: &str = "{name} ({branch})";

/// Lists the worktrees of the repository at `root`, as `git worktree list` prints them.
pub trait GitTool {
    fn list_worktrees(&self, root: &Path) -> Result<String, GitError>;
}

pub struct GitCommand {
    pub executable: PathBuf,
}

impl GitTool for GitCommand {
    fn list_worktrees(&self, root: &Path) -> Result<String, GitError> {
        let output = Command::new(&self.executable)
            .args(["worktree", "list"])
            .current_dir(root)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GitError::Spawn {
                executable: self.executable.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(GitError::Status {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worktree {
    pub path: String,
    pub branch: String,
}

/// Parses `<path> <sha> [<branch>]` lines. Lines with fewer than three fields
/// (bare repositories, blank lines) are ignored.
pub fn parse_worktree_list(output: &str) -> Vec<Worktree> {
    output
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < 3 {
                return None;
            }
            let branch = fields[2].trim_start_matches('[').trim_end_matches(']');
            Some(Worktree {
                path: fields[0].to_string(),
                branch: branch.to_string(),
            })
        })
        .collect()
}

pub fn render_name(template: &str, name: &str, branch: &str) -> String {
    template.replace("{name}", name).replace("{branch}", branch)
}

/// Replaces a git-backed bookmark with one bookmark per worktree.
///
/// Anything that is not a local git checkout, and any failure to list
/// worktrees, yields the bookmark itself.
pub fn expand(bookmark: &ProjectBookmark, git: &dyn GitTool, template: &str) -> Vec<ProjectBookmark> {
    if !bookmark.enabled {
        return vec![bookmark.clone()];
    }

    let root = match bookmark.location() {
        PathRef::Local(root) => root,
        PathRef::Uri { .. } => return vec![bookmark.clone()],
    };
    if !root.join(".git").exists() {
        return vec![bookmark.clone()];
    }

    let output = match git.list_worktrees(&root) {
        Ok(output) => output,
        Err(e) => {
            warn!("Listing worktrees of {:?} failed: {}", root, e);
            return vec![bookmark.clone()];
        }
    };

    let worktrees = parse_worktree_list(&output);
    if worktrees.is_empty() {
        debug!("No worktrees parsed for {:?}, keeping bookmark", root);
        return vec![bookmark.clone()];
    }

    info!("Expanded {} into {} worktrees", bookmark.name, worktrees.len());
    worktrees
        .into_iter()
        .map(|worktree| ProjectBookmark {
            name: render_name(template, &bookmark.name, &worktree.branch),
            root_path: worktree.path,
            enabled: true,
            tags: bookmark.tags.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::fs;

    struct StubGit {
        output: Option<&'static str>,
        calls: Cell<usize>,
    }

    impl StubGit {
        fn new(output: Option<&'static str>) -> Self {
            Self { output, calls: Cell::new(0) }
        }
    }

    impl GitTool for StubGit {
        fn list_worktrees(&self, _root: &Path) -> Result<String, GitError> {
            self.calls.set(self.calls.get() + 1);
            match self.output {
                Some(out) => Ok(out.to_string()),
                None => Err(GitError::Status {
                    status: "exit status: 128".to_string(),
                    stderr: "fatal: not a git repository".to_string(),
                }),
            }
        }
    }

    fn git_checkout() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        dir
    }

    #[test]
    fn parses_branch_and_path() {
        let parsed = parse_worktree_list(
            "/repo          0f1e2d3 [main]\n\n/repo-wt1  abc123 [feature-x]\n/bare.git (bare)\n",
        );
        assert_eq!(
            parsed,
            vec![
                Worktree { path: "/repo".into(), branch: "main".into() },
                Worktree { path: "/repo-wt1".into(), branch: "feature-x".into() },
            ]
        );
    }

    #[test]
    fn renders_template_placeholders() {
        assert_eq!(render_name("{name}:{branch}", "Repo", "feature-x"), "Repo:feature-x");
        assert_eq!(render_name("{branch}@{name}/{branch}", "R", "b"), "b@R/b");
        assert_eq!(render_name("fixed", "R", "b"), "fixed");
    }

    #[test]
    fn non_git_project_passes_through_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let bookmark = ProjectBookmark::new("Plain", &dir.path().to_string_lossy());
        let git = StubGit::new(Some("/elsewhere abc [main]"));

        assert_eq!(expand(&bookmark, &git, "{name}:{branch}"), vec![bookmark.clone()]);
        assert_eq!(git.calls.get(), 0);
    }

    #[test]
    fn uri_project_passes_through_untouched() {
        let bookmark = ProjectBookmark::new("Remote", "vscode-remote://ssh-remote+box/srv");
        let git = StubGit::new(Some("/elsewhere abc [main]"));
        assert_eq!(expand(&bookmark, &git, "{name}"), vec![bookmark]);
    }

    #[test]
    fn one_bookmark_per_worktree() {
        let dir = git_checkout();
        let bookmark = ProjectBookmark::new("Repo", &dir.path().to_string_lossy()).with_tags(&["work"]);
        let git = StubGit::new(Some("/repo abc000 [main]\n/repo-wt1  abc123 [feature-x]\n"));

        let expanded = expand(&bookmark, &git, "{name}:{branch}");
        assert_eq!(expanded.len(), 2);
        assert_eq!(expanded[1].name, "Repo:feature-x");
        assert_eq!(expanded[1].root_path, "/repo-wt1");
        assert_eq!(expanded[1].tags, vec!["work"]);
        assert!(expanded.iter().all(|b| b.enabled));
    }

    #[test]
    fn git_failure_keeps_original_bookmark() {
        let dir = git_checkout();
        let bookmark = ProjectBookmark::new("Repo", &dir.path().to_string_lossy());
        let git = StubGit::new(None);

        assert_eq!(expand(&bookmark, &git, "{name}:{branch}"), vec![bookmark.clone()]);
        assert_eq!(git.calls.get(), 1);
    }

    #[test]
    fn missing_git_executable_keeps_original_bookmark() {
        let dir = git_checkout();
        let bookmark = ProjectBookmark::new("Repo", &dir.path().to_string_lossy());
        let git = GitCommand { executable: dir.path().join("no-such-git") };

        assert_eq!(expand(&bookmark, &git, "{name}"), vec![bookmark]);
    }

    #[test]
    fn unparseable_listing_keeps_original_bookmark() {
        let dir = git_checkout();
        let bookmark = ProjectBookmark::new("Repo", &dir.path().to_string_lossy());
        let git = StubGit::new(Some("garbage\n"));
        assert_eq!(expand(&bookmark, &git, "{name}"), vec![bookmark]);
    }
}
