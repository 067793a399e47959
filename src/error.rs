use std::path::PathBuf;
use thiserror::Error;

/// Failure reading one of the editor's externally owned documents.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed recent document: missing {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum GitError {
    #[error("could not run {executable:?}: {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("git exited with {status}: {stderr}")]
    Status { status: String, stderr: String },
}

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("row {0} has no launch action")]
    NoAction(usize),

    #[error("no result at position {0}")]
    OutOfRange(usize),

    #[error("failed to spawn {executable:?}: {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
