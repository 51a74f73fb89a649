use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use charla_core::{dataset_line_count, ChatPaths, CorpusStore, TrainLog};

use crate::lock::TrainingLock;
use crate::runner::{JobRunner, JobSpec, JobStatus};

/// Conversation lines required in the corpus before retraining triggers.
pub const TRAIN_THRESHOLD: usize = 6;
/// Hard wall-clock limit on the trainer subprocess.
pub const TRAINER_TIMEOUT: Duration = Duration::from_secs(300);
/// Limit on the dataset-builder subprocess.
const DATASET_TIMEOUT: Duration = Duration::from_secs(60);
/// Below this many dataset lines, training quality is flagged in the log.
const MIN_DATASET_LINES: usize = 10;

/// External collaborators of one training cycle.
#[derive(Debug, Clone)]
pub struct TrainerConfig {
    pub dataset_builder: JobSpec,
    pub trainer: JobSpec,
    /// Files that must exist before a cycle may start.
    pub required_files: Vec<PathBuf>,
    pub threshold: usize,
}

impl TrainerConfig {
    /// Standard configuration: the dataset builder and trainer are the
    /// given binary re-entered with its `build-dataset` / `train-model`
    /// subcommands over the same data directory.
    pub fn for_binary(binary: &Path, paths: &ChatPaths) -> Self {
        let bin = binary.to_string_lossy().into_owned();
        let dir = paths.root().to_string_lossy().into_owned();
        Self {
            dataset_builder: JobSpec::new(
                bin.clone(),
                vec!["build-dataset".into(), "--dir".into(), dir.clone()],
            )
            .timeout(DATASET_TIMEOUT),
            trainer: JobSpec::new(bin, vec!["train-model".into(), "--dir".into(), dir])
                .timeout(TRAINER_TIMEOUT),
            required_files: vec![binary.to_path_buf()],
            threshold: TRAIN_THRESHOLD,
        }
    }
}

/// How the trainer step ended. Failure and timeout degrade the cycle but
/// do not stop cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerVerdict {
    Succeeded,
    Failed(i32),
    TimedOut,
}

/// Result of one `run_training_cycle` invocation. Never an `Err`: every
/// internal failure is logged and folded into a non-fatal outcome so a
/// training problem can never take the host process down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle holds the training lock; this call was a no-op.
    AlreadyRunning,
    MissingCollaborator(PathBuf),
    NoCorpus,
    /// Dataset build failed; the corpus was left untouched.
    DatasetFailed,
    /// The cycle ran to cleanup; the corpus was backed up and cleared.
    Completed { trainer: TrainerVerdict },
    Aborted(String),
}

/// Single-flight scheduler for retraining: decides when to train, holds
/// the lock for the duration of a cycle, drives the external build and
/// train steps, and rotates the consumed corpus.
pub struct Orchestrator {
    paths: ChatPaths,
    config: TrainerConfig,
    runner: Box<dyn JobRunner>,
    lock: TrainingLock,
    log: TrainLog,
    store: CorpusStore,
    active: AtomicBool,
}

impl Orchestrator {
    pub fn new(paths: ChatPaths, config: TrainerConfig, runner: Box<dyn JobRunner>) -> Self {
        let lock = TrainingLock::new(paths.lock());
        let log = TrainLog::open(paths.train_log());
        let store = CorpusStore::open(paths.corpus());
        Self {
            paths,
            config,
            runner,
            lock,
            log,
            store,
            active: AtomicBool::new(false),
        }
    }

    pub fn paths(&self) -> &ChatPaths {
        &self.paths
    }

    pub fn train_log(&self) -> &TrainLog {
        &self.log
    }

    /// True while a cycle is running in this process or the lock marker
    /// exists on disk.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) || self.lock.is_held()
    }

    /// True iff the corpus holds at least the threshold number of
    /// conversation lines. Fails closed: unreadable or missing corpus
    /// means no training.
    pub fn should_train(&self) -> bool {
        match self.store.conversation_line_count() {
            Ok(count) => {
                self.log.log(&format!(
                    "corpus conversation lines: {count}, threshold: {}",
                    self.config.threshold
                ));
                count >= self.config.threshold
            }
            Err(e) => {
                self.log.log(&format!("cannot read corpus: {e}"));
                false
            }
        }
    }

    /// Run one full retraining attempt. Single-flight: if another cycle
    /// holds the lock this returns immediately. The lock is released on
    /// every exit path.
    pub fn run_training_cycle(&self) -> CycleOutcome {
        let guard = match self.lock.acquire() {
            Ok(Some(guard)) => guard,
            Ok(None) => {
                self.log.log("training already in progress (lock held), skipping");
                return CycleOutcome::AlreadyRunning;
            }
            Err(e) => {
                self.log.log(&format!("cannot create training lock: {e}"));
                return CycleOutcome::Aborted(e.to_string());
            }
        };

        let outcome = match self.locked_cycle() {
            Ok(outcome) => outcome,
            Err(e) => {
                self.log.log(&format!("training cycle aborted: {e}"));
                CycleOutcome::Aborted(e.to_string())
            }
        };
        drop(guard);
        outcome
    }

    fn locked_cycle(&self) -> Result<CycleOutcome, crate::error::TrainError> {
        self.log.log("training cycle started");

        for file in &self.config.required_files {
            if !file.exists() {
                self.log
                    .log(&format!("missing collaborator file: {}", file.display()));
                return Ok(CycleOutcome::MissingCollaborator(file.clone()));
            }
        }

        if !self.store.exists() {
            self.log.log("no corpus to train from");
            return Ok(CycleOutcome::NoCorpus);
        }

        // Step 1: dataset build. Failing here must not lose data, so the
        // corpus is left untouched.
        self.log.log(&format!(
            "step 1: building dataset ({})",
            self.config.dataset_builder.display()
        ));
        let build = self.runner.run(&self.config.dataset_builder)?;
        if !build.success() {
            self.log.log(&format!(
                "dataset build failed ({:?}): {}",
                build.status,
                tail(&build.stderr, 500)
            ));
            return Ok(CycleOutcome::DatasetFailed);
        }
        self.log
            .log(&format!("dataset built: {}", tail(&build.stdout, 100)));

        match dataset_line_count(&self.paths.dataset()) {
            Ok(lines) => {
                self.log.log(&format!("dataset has {lines} lines"));
                if lines < MIN_DATASET_LINES {
                    self.log.log("dataset is small, training may be poor");
                }
            }
            Err(e) => self.log.log(&format!("cannot count dataset lines: {e}")),
        }

        // Step 2: trainer, bounded by a hard wall-clock timeout.
        self.log.log(&format!(
            "step 2: training model ({})",
            self.config.trainer.display()
        ));
        let started = Instant::now();
        let train = self.runner.run(&self.config.trainer)?;
        let verdict = match train.status {
            JobStatus::Exited(0) => {
                self.log.log(&format!(
                    "training succeeded in {:.1}s: {}",
                    started.elapsed().as_secs_f32(),
                    tail(&train.stdout, 200)
                ));
                TrainerVerdict::Succeeded
            }
            JobStatus::Exited(code) => {
                self.log.log(&format!(
                    "training exited with code {code}: {}",
                    tail(&train.stdout, 500)
                ));
                TrainerVerdict::Failed(code)
            }
            JobStatus::TimedOut => {
                self.log
                    .log("training exceeded its time limit and was killed");
                TrainerVerdict::TimedOut
            }
        };

        // Step 3: the trainer consumed the built dataset either way, so
        // rotate the corpus (snapshot + truncate under one lock, so an
        // exchange arriving now goes to the next generation); retraining
        // the same exchanges forever would pin the model to its first
        // conversations.
        let snapshot = self.store.rotate(&self.paths.backups())?;
        self.log
            .log(&format!("corpus rotated, snapshot at {}", snapshot.display()));

        self.log.log("training cycle finished");
        Ok(CycleOutcome::Completed { trainer: verdict })
    }

    /// Launch one cycle on a worker thread. Returns `None` when a cycle
    /// spawned from this process is still active (atomic check-and-set),
    /// so multiple trigger sites cannot double-train.
    pub fn spawn_cycle(self: &Arc<Self>) -> Option<TrainingHandle> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("training already active, not spawning another cycle");
            return None;
        }
        let orchestrator = Arc::clone(self);
        let handle = thread::spawn(move || {
            let outcome = orchestrator.run_training_cycle();
            orchestrator.active.store(false, Ordering::Release);
            outcome
        });
        Some(TrainingHandle { handle })
    }
}

/// Completion signal for a background cycle; tests and the CLI join it
/// instead of racing on timing.
#[derive(Debug)]
pub struct TrainingHandle {
    handle: thread::JoinHandle<CycleOutcome>,
}

impl TrainingHandle {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> CycleOutcome {
        self.handle
            .join()
            .unwrap_or_else(|_| CycleOutcome::Aborted("training worker panicked".into()))
    }
}

/// Last `max_chars` of a trimmed output blob, for log lines.
fn tail(text: &str, max_chars: usize) -> &str {
    let trimmed = text.trim();
    match trimmed.char_indices().nth_back(max_chars.saturating_sub(1)) {
        Some((start, _)) if start > 0 => &trimmed[start..],
        _ => trimmed,
    }
}
