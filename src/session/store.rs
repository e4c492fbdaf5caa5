//! Session file I/O
//!
//! The session file holds app and corp secrets, so it is always written
//! owner-only and a looser mode found on load is reported.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::session as session_config;
use crate::error::{OrgError, Result};

use super::models::SessionConfig;

/// Reads and writes `~/.orgctl/config.json`
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| {
            warn!("No home directory found, keeping the session file in the current directory");
            PathBuf::from(".")
        });
        Self {
            path: home
                .join(session_config::DIR_NAME)
                .join(session_config::FILE_NAME),
        }
    }

    /// Store backed by an explicit file (for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or blank file loads as an empty session; unparsable JSON is
    /// an error naming the file so it can be fixed or removed.
    pub fn load(&self) -> Result<SessionConfig> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                return Ok(SessionConfig::default());
            }
            Err(e) => {
                return Err(OrgError::Config(format!(
                    "Cannot read session file {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };
        warn_if_shared(&self.path);

        if content.trim().is_empty() {
            debug!("Session file {} is empty", self.path.display());
            return Ok(SessionConfig::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            OrgError::Config(format!(
                "Session file {} is not valid JSON ({}); fix it or delete it and run 'orgctl config set' again",
                self.path.display(),
                e
            ))
        })
    }

    /// Persist `config`, replacing the previous file in one rename.
    pub fn save(&self, config: &SessionConfig) -> Result<()> {
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| OrgError::Config(format!("Cannot encode session: {}", e)))?;
        write_private(&self.path, json.as_bytes())?;
        debug!("Saved session file {}", self.path.display());
        Ok(())
    }
}

/// Write `bytes` to `path` through a per-process temp file with mode 0600.
///
/// The temp file is removed again when any step fails.
fn write_private(path: &Path, bytes: &[u8]) -> Result<()> {
    let io_error = |what: &str, target: &Path, e: std::io::Error| {
        OrgError::Io(format!("Cannot {} {}: {}", what, target.display(), e))
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| io_error("create directory", dir, e))?;
    }

    let tmp = path.with_extension(format!("json.{}.tmp", std::process::id()));
    let written = fs::write(&tmp, bytes)
        .map_err(|e| io_error("write", tmp.as_path(), e))
        .and_then(|()| restrict_to_owner(&tmp))
        .and_then(|()| fs::rename(&tmp, path).map_err(|e| io_error("replace", path, e)));

    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
        OrgError::Io(format!(
            "Cannot make {} private: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(unix)]
fn warn_if_shared(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Ok(meta) = fs::metadata(path) {
        let mode = meta.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            warn!(
                "Session file {} is readable by other users (mode {:o}); it holds API secrets",
                path.display(),
                mode
            );
        }
    }
}

#[cfg(not(unix))]
fn warn_if_shared(_path: &Path) {}
