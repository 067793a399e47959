use crate::error::LaunchError;
use crate::model::LaunchCommand;
use log::{debug, info};
use nix::unistd::setsid;
use std::env;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// The editor the rows launch. `executable` is `None` when it could not be found.
#[derive(Debug, Clone)]
pub struct Editor {
    pub name: String,
    pub executable: Option<PathBuf>,
}

impl Editor {
    /// Uses `explicit` when it points at an executable, otherwise searches `PATH` for `binary`.
    pub fn locate(name: &str, binary: &str, explicit: Option<&Path>) -> Self {
        let executable = match explicit {
            Some(path) if is_executable(path) => Some(path.to_path_buf()),
            Some(path) => {
                debug!("Configured executable {:?} is not executable, searching PATH", path);
                find_in_path(binary)
            }
            None => find_in_path(binary),
        };
        info!("Editor {}: executable {:?}", name, executable);
        Self {
            name: name.to_string(),
            executable,
        }
    }
}

fn is_executable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}

pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    find_in_dirs(binary, env::split_paths(&path_var))
}

fn find_in_dirs(binary: &str, dirs: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(binary))
        .find(|candidate| is_executable(candidate))
}

/// Receives the command of a chosen row.
pub trait LaunchSink {
    fn launch(&self, command: &LaunchCommand) -> Result<(), LaunchError>;
}

/// Starts the editor in its own session with no stdio, and never waits for it.
pub struct DetachedLauncher;

impl LaunchSink for DetachedLauncher {
    fn launch(&self, launch: &LaunchCommand) -> Result<(), LaunchError> {
        let mut command = Command::new(&launch.executable);
        command
            .args(&launch.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            command.pre_exec(|| setsid().map(|_| ()).map_err(std::io::Error::from));
        }

        info!("Launching {:?} {:?}", launch.executable, launch.args);
        command.spawn().map_err(|source| LaunchError::Spawn {
            executable: launch.executable.clone(),
            source,
        })?;
        Ok(())
    }
}
