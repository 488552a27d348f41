//! Cross-process liveness via a named OS lock primitive (spec §4.5 "Session
//! mutex"): one process, one session id, one lock file held for the process
//! lifetime. A second process probing the same lock file fails to acquire
//! it while the first is alive — that failure *is* the liveness signal.

use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use tracing::debug;

fn runtime_dir() -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

/// Socket-file path for a session id (spec §6 "Named mutex socket files").
pub fn session_lock_path(session_id: &str) -> PathBuf {
    runtime_dir().join(format!("vscd-{session_id}.sock"))
}

/// A process-wide session. Held for the entire process lifetime; the lock is
/// released by the OS on exit, never explicitly in business code (spec §5).
pub struct Session {
    id: String,
    _lock_file: File,
}

impl Session {
    pub fn start() -> std::io::Result<Self> {
        let id = uuid::Uuid::new_v4().to_string();
        let path = session_lock_path(&id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).write(true).open(&path)?;
        file.lock_exclusive()?;
        debug!(session.id = %id, path = %path.display(), "session mutex acquired");
        Ok(Self {
            id,
            _lock_file: file,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the process owning `session_id` is still alive, probed by
    /// attempting a non-blocking acquisition of its lock file: success means
    /// the owner exited and released it (spec §4.5 `installHasNoLiveDependents`).
    pub fn is_session_alive(session_id: &str) -> bool {
        let path = session_lock_path(session_id);
        let file = match OpenOptions::new().create(true).write(true).open(&path) {
            Ok(f) => f,
            Err(_) => return false,
        };
        match file.try_lock_exclusive() {
            Ok(()) => {
                let _ = FileExt::unlock(&file);
                false
            }
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_lock_path_is_under_runtime_dir() {
        let path = session_lock_path("abc");
        assert_eq!(path.file_name().unwrap(), "vscd-abc.sock");
    }

    #[test]
    fn own_session_reports_alive() {
        let session = Session::start().unwrap();
        // a second, independent file descriptor cannot also take the lock
        // while the original is held, which is exactly the liveness signal.
        assert!(Session::is_session_alive(session.id()));
    }

    #[test]
    fn unrelated_session_id_reports_dead() {
        assert!(!Session::is_session_alive("never-started-session"));
    }
}
