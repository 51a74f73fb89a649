use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::Local;

/// Append-only, timestamped training log. Write-only observability: the
/// core never parses it back, it is only surfaced verbatim to operators.
#[derive(Debug, Clone)]
pub struct TrainLog {
    path: PathBuf,
}

impl TrainLog {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one timestamped line, mirroring it to tracing. Logging must
    /// never take a training cycle down, so write errors are swallowed
    /// after being reported.
    pub fn log(&self, msg: &str) {
        tracing::info!(target: "charla::train", "{msg}");
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{stamp}] {msg}\n");
        let write = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| f.write_all(line.as_bytes()));
        if let Err(e) = write {
            tracing::warn!(path = %self.path.display(), "train log write failed: {e}");
        }
    }

    /// Full log content, for the `logs` control surface. Empty if absent.
    pub fn read(&self) -> std::io::Result<String> {
        if !self.path.exists() {
            return Ok(String::new());
        }
        fs::read_to_string(&self.path)
    }
}
