use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecentKind {
    File,
    Folder,
    Workspace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentEntry {
    pub path: String,
    pub kind: RecentKind,
}

/// The editor's recent history, in recency order as stored by the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentLists {
    pub files: Vec<String>,
    pub folders: Vec<String>,
    pub workspaces: Vec<String>,
}

/// Narrows which recent entries a query looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Files,
    Folders,
}

impl RecentLists {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty() && self.workspaces.is_empty()
    }

    /// Candidate entries for `scope`: folders and workspaces merged with
    /// first-occurrence dedup, then files.
    pub fn pool(&self, scope: Scope) -> Vec<RecentEntry> {
        let mut pool = Vec::new();

        if scope != Scope::Files {
            let mut seen = HashSet::new();
            let folders = self.folders.iter().map(|p| (p, RecentKind::Folder));
            let workspaces = self.workspaces.iter().map(|p| (p, RecentKind::Workspace));
            for (path, kind) in folders.chain(workspaces) {
                if seen.insert(path.as_str()) {
                    pool.push(RecentEntry { path: path.clone(), kind });
                }
            }
        }

        if scope != Scope::Folders {
            pool.extend(self.files.iter().map(|path| RecentEntry {
                path: path.clone(),
                kind: RecentKind::File,
            }));
        }

        pool
    }
}

/// A named project from the Project Manager extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ProjectBookmark {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "rootPath")]
    pub root_path: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_enabled() -> bool { true }

impl ProjectBookmark {
    pub fn new(name: &str, root_path: &str) -> Self {
        Self {
            name: name.to_string(),
            root_path: root_path.to_string(),
            enabled: true,
            tags: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn location(&self) -> PathRef {
        PathRef::parse(&self.root_path)
    }
}

/// Where a project lives: a local directory, or an opaque URI the editor resolves itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRef {
    Local(PathBuf),
    Uri { scheme: String, rest: String },
}

fn scheme_regex() -> Option<&'static Regex> {
    static SCHEME: OnceLock<Option<Regex>> = OnceLock::new();
    // Two characters minimum so `C:\...` stays a local path.
    SCHEME
        .get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]+):(.*)$").ok())
        .as_ref()
}

impl PathRef {
    pub fn parse(raw: &str) -> Self {
        if let Some(rest) = raw.strip_prefix("file:") {
            let rest = rest.strip_prefix("//").unwrap_or(rest);
            return PathRef::Local(PathBuf::from(percent_decode(rest)));
        }
        match scheme_regex().and_then(|re| re.captures(raw)) {
            Some(caps) => PathRef::Uri {
                scheme: caps[1].to_string(),
                rest: caps[2].to_string(),
            },
            None => PathRef::Local(PathBuf::from(raw)),
        }
    }

    pub fn uri(&self) -> String {
        match self {
            PathRef::Local(path) => file_uri(path),
            PathRef::Uri { scheme, rest } => format!("{}:{}", scheme, rest),
        }
    }

    /// Only local paths can be checked; URIs are trusted.
    pub fn exists(&self, exists: &dyn Fn(&Path) -> bool) -> bool {
        match self {
            PathRef::Local(path) => exists(path),
            PathRef::Uri { .. } => true,
        }
    }

    pub fn display(&self) -> String {
        match self {
            PathRef::Local(path) => path.to_string_lossy().into_owned(),
            PathRef::Uri { .. } => self.uri(),
        }
    }
}

/// Builds a `file://` URI, percent-encoding everything outside the unreserved set.
pub fn file_uri(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut uri = String::from("file://");
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                uri.push(byte as char)
            }
            _ => uri.push_str(&format!("%{:02X}", byte)),
        }
    }
    uri
}

pub fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultKind {
    NewWindow,
    Project,
    RecentFile,
    RecentFolder,
    NotFound,
}

impl From<RecentKind> for ResultKind {
    fn from(kind: RecentKind) -> Self {
        match kind {
            RecentKind::File => ResultKind::RecentFile,
            RecentKind::Folder | RecentKind::Workspace => ResultKind::RecentFolder,
        }
    }
}

/// A fully resolved process invocation, built when the row is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchCommand {
    pub executable: PathBuf,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    pub label: String,
    pub subtext: String,
    pub kind: ResultKind,
    pub launch_path: String,
    pub command: Option<LaunchCommand>,
}

impl ResultItem {
    pub fn not_found(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            subtext: String::new(),
            kind: ResultKind::NotFound,
            launch_path: String::new(),
            command: None,
        }
    }
}
