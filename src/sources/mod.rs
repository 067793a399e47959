use crate::error::SourceError;
use crate::model::{ProjectBookmark, RecentLists};

/// The editor's recently opened files, folders and workspaces.
pub trait RecentSource {
    fn read_recent(&self) -> Result<RecentLists, SourceError>;
}

/// Named projects. Never fails: an unreadable store is logged and reads as empty.
pub trait ProjectSource {
    fn read_projects(&self) -> Vec<ProjectBookmark>;
}

pub mod projects;
pub mod recent;
pub mod worktree;
