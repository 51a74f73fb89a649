use std::fs;
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};

use chrono::Local;

/// Single-flight mutual exclusion for training cycles.
///
/// The marker file's existence means "training in progress"; its atomic
/// `create_new` creation is the sole coordination point, in-process and
/// across processes alike. The returned guard removes the marker when
/// dropped, so the lock cannot outlive its cycle on any exit path short
/// of a process crash.
#[derive(Debug, Clone)]
pub struct TrainingLock {
    path: PathBuf,
}

/// RAII holder for an acquired training lock.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
}

impl TrainingLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_held(&self) -> bool {
        self.path.exists()
    }

    /// Try to take the lock. `Ok(None)` means another cycle holds it.
    pub fn acquire(&self) -> std::io::Result<Option<LockGuard>> {
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(None),
            Err(e) => return Err(e),
        };
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        file.write_all(format!("Training started: {stamp}\n").as_bytes())?;
        Ok(Some(LockGuard {
            path: self.path.clone(),
        }))
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), "failed to remove training lock: {e}");
        }
    }
}
