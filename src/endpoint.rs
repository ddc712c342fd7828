//! Locating the keyring daemon's control socket.

use std::ffi::OsString;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};

use crate::error::UnlockError;

/// Directory the running keyring daemon exports for its own sockets
pub const KEYRING_CONTROL_VAR: &str = "GNOME_KEYRING_CONTROL";

/// Per-user runtime directory, used when the daemon did not export one
pub const RUNTIME_DIR_VAR: &str = "XDG_RUNTIME_DIR";

/// Path of the control socket, resolved once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlEndpoint(PathBuf);

impl ControlEndpoint {
    /// Resolve from the process environment
    pub fn resolve() -> Result<Self, UnlockError> {
        Self::resolve_with(|name| std::env::var_os(name))
    }

    /// Resolve using `lookup` in place of the process environment.
    ///
    /// `$GNOME_KEYRING_CONTROL/control` wins over
    /// `$XDG_RUNTIME_DIR/keyring/control`; a candidate only counts if it is a
    /// socket.
    pub fn resolve_with<F>(lookup: F) -> Result<Self, UnlockError>
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let candidates = [
            (KEYRING_CONTROL_VAR, Path::new("control")),
            (RUNTIME_DIR_VAR, Path::new("keyring/control")),
        ];

        for (var, suffix) in candidates {
            let Some(dir) = lookup(var) else {
                log::debug!("{} is not set", var);
                continue;
            };

            let candidate = PathBuf::from(dir).join(suffix);
            if is_socket(&candidate) {
                log::debug!("Using control socket {} (from {})", candidate.display(), var);
                return Ok(Self(candidate));
            }
        }

        Err(UnlockError::EndpointNotFound)
    }

    /// Use an explicitly configured path, subject to the same socket check
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, UnlockError> {
        let path = path.into();
        if is_socket(&path) {
            Ok(Self(path))
        } else {
            Err(UnlockError::EndpointNotFound)
        }
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for ControlEndpoint {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// True if `path` exists and is a socket (symlinks are followed)
fn is_socket(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => true,
        Ok(_) => {
            log::debug!("Ignoring {}: not a socket", path.display());
            false
        }
        Err(e) => {
            log::debug!("Ignoring {}: {}", path.display(), e);
            false
        }
    }
}
