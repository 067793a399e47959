use crate::matcher::MAX_ITEMS;
use crate::sources::worktree::DEFAULT_NAME_TEMPLATE;
use anyhow::{bail, Result};
use clap::ValueEnum;
use directories::{BaseDirs, ProjectDirs};
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub worktrees: WorktreeConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Editor variants sharing the same storage layout.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Code,
    Insiders,
    Codium,
    Cursor,
}

impl Mode {
    pub fn display_name(self) -> &'static str {
        match self {
            Mode::Code => "Visual Studio Code",
            Mode::Insiders => "Visual Studio Code - Insiders",
            Mode::Codium => "VSCodium",
            Mode::Cursor => "Cursor",
        }
    }

    pub fn executable_name(self) -> &'static str {
        match self {
            Mode::Code => "code",
            Mode::Insiders => "code-insiders",
            Mode::Codium => "codium",
            Mode::Cursor => "cursor",
        }
    }

    /// Directory under the user config dir holding the editor's `User` folder.
    pub fn config_dir_name(self) -> &'static str {
        match self {
            Mode::Code => "Code",
            Mode::Insiders => "Code - Insiders",
            Mode::Codium => "VSCodium",
            Mode::Cursor => "Cursor",
        }
    }
}

/// When the session re-reads its sources.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Refresh {
    /// Once at startup and on explicit refresh.
    #[default]
    Session,
    /// Before every query.
    Query,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub refresh: Refresh,
    #[serde(default)]
    pub executable: Option<PathBuf>,
}

fn default_max_items() -> usize { MAX_ITEMS }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            max_items: default_max_items(),
            refresh: Refresh::default(),
            executable: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct WorktreeConfig {
    #[serde(default)]
    pub extract: bool,
    #[serde(default = "default_git")]
    pub git: PathBuf,
    #[serde(default = "default_name_template")]
    pub name_template: String,
}

fn default_git() -> PathBuf { PathBuf::from("git") }
fn default_name_template() -> String { DEFAULT_NAME_TEMPLATE.to_string() }

impl Default for WorktreeConfig {
    fn default() -> Self {
        Self {
            extract: false,
            git: default_git(),
            name_template: default_name_template(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct PathsConfig {
    pub storage: Option<PathBuf>,
    pub projects: Option<PathBuf>,
}

impl Config {
    fn global_storage(&self) -> PathBuf {
        let config_dir = BaseDirs::new()
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".config"));
        config_dir
            .join(self.general.mode.config_dir_name())
            .join("User")
            .join("globalStorage")
    }

    pub fn storage_path(&self) -> PathBuf {
        self.paths
            .storage
            .clone()
            .unwrap_or_else(|| self.global_storage().join("storage.json"))
    }

    pub fn projects_path(&self) -> PathBuf {
        self.paths.projects.clone().unwrap_or_else(|| {
            self.global_storage()
                .join("alefragnani.project-manager")
                .join("projects.json")
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.max_items == 0 {
            bail!("general.max_items must be at least 1");
        }
        if self.worktrees.git.as_os_str().is_empty() {
            bail!("worktrees.git must not be empty");
        }
        if self.worktrees.extract && !self.worktrees.name_template.contains("{branch}") {
            warn!(
                "worktrees.name_template {:?} has no {{branch}}, worktrees will share a name",
                self.worktrees.name_template
            );
        }
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    match ProjectDirs::from("org", "recent-code", "recent-code") {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

pub fn load_config() -> Result<Config> {
    load_config_from(&config_path())
}

/// Parses the file without validating it; callers validate once, after
/// applying command-line overrides.
pub fn load_config_from(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        debug!("No config at {:?}, using defaults", config_path);
        return Ok(Config::default());
    }

    let content = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}
