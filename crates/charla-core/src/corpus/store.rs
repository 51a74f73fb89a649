use std::fs;
use std::io::{Read as _, Write as _};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::error::CoreError;

/// Line prefix for the user side of an exchange.
pub const USER_PREFIX: &str = "usuario:";
/// Line prefix for the generated side of an exchange.
pub const BOT_PREFIX: &str = "ia:";

/// One accepted (utterance, reply) exchange. Identity is append position;
/// records are never updated, only appended or bulk-cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationRecord {
    pub utterance: String,
    pub reply: String,
}

/// File-backed, append-only conversation log.
///
/// Persisted as alternating `usuario:`/`ia:` labeled lines. Reads and
/// writes take `fs2` file locks so the request flow and the orchestrator
/// can touch the file concurrently; all request-side mutations are
/// appends, only the orchestrator clears.
#[derive(Debug, Clone)]
pub struct CorpusStore {
    path: PathBuf,
}

impl CorpusStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Append one exchange as a `usuario:`/`ia:` line pair under an
    /// exclusive lock.
    pub fn append(&self, record: &ConversationRecord) -> Result<(), CoreError> {
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        fs2::FileExt::lock_exclusive(&file)?;
        let result = (&file).write_all(
            format!(
                "{USER_PREFIX} {}\n{BOT_PREFIX} {}\n",
                record.utterance, record.reply
            )
            .as_bytes(),
        );
        fs2::FileExt::unlock(&file)?;
        result?;
        Ok(())
    }

    /// Read the whole file under a shared lock.
    pub fn read_raw(&self) -> Result<String, CoreError> {
        if !self.path.exists() {
            return Err(CoreError::CorpusMissing(self.path.clone()));
        }
        let file = fs::OpenOptions::new().read(true).open(&self.path)?;
        fs2::FileExt::lock_shared(&file)?;
        let mut data = String::new();
        let result = (&file).read_to_string(&mut data);
        fs2::FileExt::unlock(&file)?;
        result?;
        Ok(data)
    }

    /// Count non-blank lines carrying either conversation prefix. This is
    /// the quantity the training threshold is checked against.
    pub fn conversation_line_count(&self) -> Result<usize, CoreError> {
        let raw = self.read_raw()?;
        Ok(raw
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with(USER_PREFIX) || l.starts_with(BOT_PREFIX))
            .count())
    }

    /// Scan adjacent `usuario:`/`ia:` line pairs into records, skipping
    /// malformed or incomplete lines rather than repairing them.
    pub fn records(&self) -> Result<Vec<ConversationRecord>, CoreError> {
        let raw = self.read_raw()?;
        let lines: Vec<&str> = raw.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

        let mut records = Vec::new();
        let mut i = 0;
        while i + 1 < lines.len() {
            if lines[i].starts_with(USER_PREFIX) && lines[i + 1].starts_with(BOT_PREFIX) {
                let utterance = lines[i][USER_PREFIX.len()..].trim();
                let reply = lines[i + 1][BOT_PREFIX.len()..].trim();
                if !utterance.is_empty() && !reply.is_empty() {
                    records.push(ConversationRecord {
                        utterance: utterance.to_string(),
                        reply: reply.to_string(),
                    });
                    i += 2;
                } else {
                    i += 1;
                }
            } else {
                i += 1;
            }
        }
        Ok(records)
    }

    /// Truncate the log to empty. The file itself is kept.
    pub fn clear(&self) -> Result<(), CoreError> {
        let file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        fs2::FileExt::lock_exclusive(&file)?;
        fs2::FileExt::unlock(&file)?;
        Ok(())
    }

    /// Snapshot the current content into `dir` under a timestamped name,
    /// then truncate the log, all under one exclusive lock: a concurrent
    /// append lands either wholly in the snapshot or in the next corpus
    /// generation, never in neither. Snapshots are immutable and never
    /// evicted. Returns the snapshot path.
    pub fn rotate(&self, dir: &Path) -> Result<PathBuf, CoreError> {
        fs::create_dir_all(dir)?;
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)?;
        fs2::FileExt::lock_exclusive(&file)?;
        let result = rotate_locked(&file, dir);
        fs2::FileExt::unlock(&file)?;
        Ok(result?)
    }
}

fn rotate_locked(mut file: &fs::File, dir: &Path) -> std::io::Result<PathBuf> {
    let mut data = String::new();
    file.read_to_string(&mut data)?;
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let target = dir.join(format!("chat_logs_{stamp}.txt"));
    fs::write(&target, &data)?;
    file.set_len(0)?;
    Ok(target)
}
