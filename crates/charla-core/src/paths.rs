use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoreError;

const CORPUS_FILE: &str = "chat_logs.txt";
const DATASET_FILE: &str = "data.txt";
const MODEL_FILE: &str = "model.json";
const LOCK_FILE: &str = "training.lock";
const TRAIN_LOG_FILE: &str = "train.log";
const BACKUP_DIR: &str = "backups";

/// Starter dataset written when `data.txt` is absent, so a blank install
/// can train a first model.
pub const SEED_DATASET: &str = "hola\ncomo estas\nbien\nque haces\nnada\nadios\n";

/// Minimal corpus content used when a training cycle is forced on an
/// empty corpus.
pub const SEED_CORPUS: &str =
    "usuario: hola\nia: hola como estas\nusuario: que tal\nia: bien gracias\n";

/// Layout of all persisted files under a single data directory.
///
/// The file names are part of the external contract: the dataset builder
/// and trainer subprocesses resolve the same paths from the same root.
#[derive(Debug, Clone)]
pub struct ChatPaths {
    root: PathBuf,
}

impl ChatPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The conversation log (`usuario:` / `ia:` line pairs).
    pub fn corpus(&self) -> PathBuf {
        self.root.join(CORPUS_FILE)
    }

    /// The flat training-pair file consumed by the trainer.
    pub fn dataset(&self) -> PathBuf {
        self.root.join(DATASET_FILE)
    }

    /// The persisted model artifact.
    pub fn model(&self) -> PathBuf {
        self.root.join(MODEL_FILE)
    }

    /// The single-flight training lock marker.
    pub fn lock(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// The append-only training log.
    pub fn train_log(&self) -> PathBuf {
        self.root.join(TRAIN_LOG_FILE)
    }

    /// Directory holding timestamped corpus snapshots.
    pub fn backups(&self) -> PathBuf {
        self.root.join(BACKUP_DIR)
    }

    /// Create the data directory, the backup directory, an empty corpus,
    /// and a starter dataset where absent. Existing files are left alone.
    pub fn ensure_seeded(&self) -> Result<(), CoreError> {
        fs::create_dir_all(&self.root)?;
        fs::create_dir_all(self.backups())?;

        let corpus = self.corpus();
        if !corpus.exists() {
            fs::write(&corpus, "")?;
            tracing::info!(path = %corpus.display(), "created empty corpus");
        }

        let dataset = self.dataset();
        if !dataset.exists() {
            fs::write(&dataset, SEED_DATASET)?;
            tracing::info!(path = %dataset.display(), "created starter dataset");
        }

        Ok(())
    }
}
