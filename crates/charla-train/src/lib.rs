//! Training orchestration for charla: the single-flight retraining state
//! machine, the job-runner boundary around its external build and train
//! steps, and the chat service that ties the decoder, the accept policy,
//! and the retraining trigger together.
//!
//! Concurrency model: one synchronous request flow plus at most one
//! background training worker. The lock marker on disk is the only
//! cross-actor coordination point; an atomic flag deduplicates triggers
//! within the process.

pub mod error;
pub mod lock;
pub mod orchestrator;
pub mod runner;
pub mod service;

pub use error::TrainError;
pub use lock::{LockGuard, TrainingLock};
pub use orchestrator::{
    CycleOutcome, Orchestrator, TrainerConfig, TrainerVerdict, TrainingHandle, TRAINER_TIMEOUT,
    TRAIN_THRESHOLD,
};
pub use runner::{JobOutcome, JobRunner, JobSpec, JobStatus, ProcessRunner};
pub use service::{ChatService, ChatTurn, ForceOutcome, SystemStatus};
