use crate::error::SourceError;
use crate::model::{percent_decode, RecentLists};
use crate::sources::RecentSource;
use log::{debug, info};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

const RECENT_MENU_ID: &str = "submenuitem.MenubarRecentMenu";
const OPEN_RECENT_FILE: &str = "openRecentFile";
const OPEN_RECENT_FOLDER: &str = "openRecentFolder";

/// Reads the editor's `storage.json`.
pub struct StorageFileSource {
    pub path: PathBuf,
}

impl RecentSource for StorageFileSource {
    fn read_recent(&self) -> Result<RecentLists, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })?;
        let document: Value = serde_json::from_str(&content).map_err(|source| SourceError::Json {
            path: self.path.clone(),
            source,
        })?;
        let lists = parse(&document)?;
        info!(
            "StorageFileSource: {} files, {} folders, {} workspaces",
            lists.files.len(),
            lists.folders.len(),
            lists.workspaces.len()
        );
        Ok(lists)
    }
}

fn missing(what: &str) -> SourceError {
    SourceError::Malformed(what.to_string())
}

/// Extracts the recent lists from a parsed storage document, keeping document order.
pub fn parse(document: &Value) -> Result<RecentLists, SourceError> {
    let menu_items = document
        .pointer("/lastKnownMenubarData/menus/File/items")
        .and_then(Value::as_array)
        .ok_or_else(|| missing("lastKnownMenubarData.menus.File.items"))?;

    let recent_items = menu_items
        .iter()
        .find(|item| item.get("id").and_then(Value::as_str) == Some(RECENT_MENU_ID))
        .and_then(|item| item.pointer("/submenu/items"))
        .and_then(Value::as_array)
        .ok_or_else(|| missing("File > Open Recent submenu"))?;

    let mut lists = RecentLists::default();
    for item in recent_items {
        let target = match item.get("id").and_then(Value::as_str) {
            Some(OPEN_RECENT_FILE) => &mut lists.files,
            Some(OPEN_RECENT_FOLDER) => &mut lists.folders,
            _ => continue,
        };
        if item.get("enabled").and_then(Value::as_bool) != Some(true) {
            continue;
        }
        let path = item
            .pointer("/uri/path")
            .and_then(Value::as_str)
            .ok_or_else(|| missing("uri.path of a recent entry"))?;
        target.push(path.to_string());
    }

    if let Some(workspaces) = document
        .pointer("/profileAssociations/workspaces")
        .and_then(Value::as_object)
    {
        lists.workspaces = workspaces
            .keys()
            .map(|uri| match uri.strip_prefix("file://") {
                Some(path) => percent_decode(path),
                None => uri.clone(),
            })
            .collect();
    }

    debug!("recent lists: {:?}", lists);
    Ok(lists)
}
