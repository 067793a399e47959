use crate::model::ProjectBookmark;
use crate::sources::ProjectSource;
use log::{debug, info, warn};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Reads the Project Manager extension's `projects.json`.
pub struct ProjectsFileSource {
    pub path: PathBuf,
}

impl ProjectSource for ProjectsFileSource {
    fn read_projects(&self) -> Vec<ProjectBookmark> {
        if !self.path.exists() {
            debug!("Projects file {:?} does not exist, skipping", self.path);
            return Vec::new();
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Error reading Project Manager settings {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        match parse(&content) {
            Ok(projects) => {
                info!("ProjectsFileSource: found {} projects", projects.len());
                projects
            }
            Err(e) => {
                warn!("Error parsing Project Manager settings {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }
}

/// Parses a project list. Entries without a name or root path, or with
/// fields of the wrong type, are dropped without complaint.
pub fn parse(content: &str) -> Result<Vec<ProjectBookmark>, serde_json::Error> {
    let raw: Vec<Value> = serde_json::from_str(content)?;
    Ok(raw
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<ProjectBookmark>(entry).ok())
        .filter(|project| !project.name.is_empty() && !project.root_path.is_empty())
        .collect())
}
