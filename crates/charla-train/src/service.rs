use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Local;
use serde::Serialize;

use charla_core::paths::{SEED_CORPUS, SEED_DATASET};
use charla_core::{
    accepts, clean_files, dataset_line_count, ChatPaths, CleanReport, ConversationRecord,
    CorpusStore, CoreError, USER_PREFIX,
};
use charla_model::{Decoder, ModelError};

use crate::orchestrator::{Orchestrator, TrainingHandle};

const EMPTY_MESSAGE_REPLY: &str = "Por favor, escribe un mensaje";
const BLANK_DECODE_REPLY: &str = "No tengo una respuesta para eso ahora mismo";
/// Returned while no model artifact is loadable. Deliberately longer than
/// the accept bound so degraded exchanges never enter the corpus.
const DEGRADED_REPLY: &str = "Ahora mismo no puedo generar respuestas, inténtalo más tarde";

/// Result of one chat turn.
#[derive(Debug)]
pub struct ChatTurn {
    pub reply: String,
    /// Whether the exchange passed the accept policy and was persisted.
    pub stored: bool,
    /// Present when this turn triggered a background training cycle.
    pub training: Option<TrainingHandle>,
}

/// Outcome of a manual training trigger.
#[derive(Debug)]
pub enum ForceOutcome {
    /// A cycle is already running; nothing was started.
    Busy,
    Started(TrainingHandle),
}

/// Serializable snapshot of the whole system, for the status surface.
#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub timestamp: String,
    pub model_exists: bool,
    pub model_bytes: Option<u64>,
    pub corpus_exists: bool,
    pub corpus_lines: usize,
    pub conversations: usize,
    pub dataset_exists: bool,
    pub dataset_lines: usize,
    pub training_active: bool,
    pub lock_present: bool,
    pub should_train: bool,
}

/// Ties the decoder, the accept policy, and the training trigger together
/// behind one chat entry point. The decoder snapshot is loaded once; a
/// process restart picks up a freshly trained artifact.
pub struct ChatService {
    paths: ChatPaths,
    store: CorpusStore,
    decoder: Option<Mutex<Decoder>>,
    orchestrator: Arc<Orchestrator>,
}

impl ChatService {
    /// Seed the on-disk layout and load the model artifact if one exists.
    /// A missing or unreadable artifact degrades replies instead of
    /// failing: the capability returns after the first successful retrain.
    pub fn open(orchestrator: Arc<Orchestrator>, rng_seed: Option<u64>) -> Result<Self, CoreError> {
        let paths = orchestrator.paths().clone();
        paths.ensure_seeded()?;

        let decoder = match Decoder::load(&paths.model(), rng_seed) {
            Ok(decoder) => Some(Mutex::new(decoder)),
            Err(ModelError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("no model artifact yet, replies degraded until first training");
                None
            }
            Err(e) => {
                tracing::warn!("cannot load model artifact: {e}");
                None
            }
        };

        let store = CorpusStore::open(paths.corpus());
        Ok(Self {
            paths,
            store,
            decoder,
            orchestrator,
        })
    }

    pub fn has_model(&self) -> bool {
        self.decoder.is_some()
    }

    pub fn paths(&self) -> &ChatPaths {
        &self.paths
    }

    pub fn orchestrator(&self) -> &Arc<Orchestrator> {
        &self.orchestrator
    }

    /// One chat turn: decode a reply, apply the accept policy, and check
    /// the retraining trigger after the exchange is persisted. Training
    /// runs on a worker thread; this call never blocks on it.
    pub fn handle_message(&self, message: &str) -> ChatTurn {
        let message = message.trim();
        if message.is_empty() {
            return ChatTurn {
                reply: EMPTY_MESSAGE_REPLY.to_string(),
                stored: false,
                training: None,
            };
        }

        let reply = match &self.decoder {
            Some(decoder) => decoder
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .generate(&message.to_lowercase()),
            None => DEGRADED_REPLY.to_string(),
        };
        let reply = if reply.trim().is_empty() {
            BLANK_DECODE_REPLY.to_string()
        } else {
            reply
        };

        let stored = if accepts(message, &reply) {
            match self.store.append(&ConversationRecord {
                utterance: message.to_string(),
                reply: reply.clone(),
            }) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("cannot append exchange to corpus: {e}");
                    false
                }
            }
        } else {
            tracing::debug!(message, reply = %reply, "exchange rejected by accept policy");
            false
        };

        let training = if self.orchestrator.should_train() {
            self.orchestrator.spawn_cycle()
        } else {
            None
        };

        ChatTurn {
            reply,
            stored,
            training,
        }
    }

    /// Manually trigger a training cycle, seeding minimal corpus and
    /// dataset content on a blank install so the cycle has something to
    /// consume. Rejected while a cycle is active.
    pub fn force_training(&self) -> Result<ForceOutcome, CoreError> {
        if self.orchestrator.is_active() {
            return Ok(ForceOutcome::Busy);
        }

        if file_empty(&self.paths.corpus()) {
            fs::write(self.paths.corpus(), SEED_CORPUS)?;
            tracing::info!("corpus seeded for forced training");
        }
        if file_empty(&self.paths.dataset()) {
            fs::write(self.paths.dataset(), SEED_DATASET)?;
            tracing::info!("dataset seeded for forced training");
        }

        match self.orchestrator.spawn_cycle() {
            Some(handle) => Ok(ForceOutcome::Started(handle)),
            None => Ok(ForceOutcome::Busy),
        }
    }

    /// Reapply the word-count filters to the persisted files. The model
    /// is untouched.
    pub fn clean(&self) -> Result<CleanReport, CoreError> {
        clean_files(&self.paths.corpus(), &self.paths.dataset())
    }

    /// Delete the model artifact and clear the corpus, forcing the next
    /// training run to start from a blank model. The dataset is reseeded
    /// if empty so that run has material.
    pub fn reset_model(&self) -> Result<(), CoreError> {
        let model = self.paths.model();
        if model.exists() {
            fs::remove_file(&model)?;
            tracing::info!("model artifact deleted");
        }
        if file_empty(&self.paths.dataset()) {
            fs::write(self.paths.dataset(), SEED_DATASET)?;
        }
        if self.paths.corpus().exists() {
            self.store.clear()?;
        }
        Ok(())
    }

    pub fn status(&self) -> SystemStatus {
        let corpus_raw = self.store.read_raw().unwrap_or_default();
        let corpus_lines = corpus_raw.lines().filter(|l| !l.trim().is_empty()).count();
        let conversations = corpus_raw
            .lines()
            .filter(|l| l.trim_start().starts_with(USER_PREFIX))
            .count();
        let model_bytes = fs::metadata(self.paths.model()).ok().map(|m| m.len());

        SystemStatus {
            timestamp: Local::now().to_rfc3339(),
            model_exists: self.paths.model().exists(),
            model_bytes,
            corpus_exists: self.paths.corpus().exists(),
            corpus_lines,
            conversations,
            dataset_exists: self.paths.dataset().exists(),
            dataset_lines: dataset_line_count(&self.paths.dataset()).unwrap_or(0),
            training_active: self.orchestrator.is_active(),
            lock_present: self.paths.lock().exists(),
            should_train: self.orchestrator.should_train(),
        }
    }
}

fn file_empty(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true)
}
