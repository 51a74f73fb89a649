use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;

use charla_core::ChatPaths;
use charla_train::{
    ChatService, CycleOutcome, Orchestrator, ProcessRunner, TrainerConfig, TrainerVerdict,
};

pub mod ask;
pub mod build_dataset;
pub mod chat;
pub mod clean;
pub mod logs;
pub mod reset;
pub mod status;
pub mod train;
pub mod train_model;

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat session
    Chat(chat::ChatArgs),
    /// Send a single message and print the reply
    Ask(ask::AskArgs),
    /// Force a training cycle and wait for it to finish
    Train(train::TrainArgs),
    /// Append corpus pairs to the training-pair file (run by the orchestrator)
    BuildDataset(build_dataset::BuildDatasetArgs),
    /// Fit and persist the model from the training-pair file (run by the orchestrator)
    TrainModel(train_model::TrainModelArgs),
    /// Show the state of the corpus, dataset, model, and training lock
    Status(status::StatusArgs),
    /// Drop oversized lines from the corpus and dataset
    Clean(clean::CleanArgs),
    /// Delete the model and clear the corpus to retrain from scratch
    Reset(reset::ResetArgs),
    /// Print the training log
    Logs(logs::LogsArgs),
}

/// Open the chat service over `dir`, wiring the orchestrator to re-enter
/// this binary for its dataset and training subprocesses.
pub(crate) fn open_service(dir: &Path, rng_seed: Option<u64>) -> Result<ChatService> {
    let paths = ChatPaths::new(dir);
    tracing::debug!(dir = %dir.display(), "opening chat service");
    let binary = std::env::current_exe().context("Cannot locate the charla binary")?;
    let config = TrainerConfig::for_binary(&binary, &paths);
    let orchestrator = Arc::new(Orchestrator::new(
        paths,
        config,
        Box::new(ProcessRunner::default()),
    ));
    ChatService::open(orchestrator, rng_seed).context("Failed to open the chat service")
}

pub(crate) fn describe_outcome(outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::AlreadyRunning => "ya hay un entrenamiento en curso".into(),
        CycleOutcome::MissingCollaborator(path) => {
            format!("falta un archivo necesario: {}", path.display())
        }
        CycleOutcome::NoCorpus => "no hay corpus del que entrenar".into(),
        CycleOutcome::DatasetFailed => {
            "la construcción del dataset falló (el corpus queda intacto)".into()
        }
        CycleOutcome::Completed {
            trainer: TrainerVerdict::Succeeded,
        } => "entrenamiento completado".into(),
        CycleOutcome::Completed {
            trainer: TrainerVerdict::Failed(code),
        } => format!("el entrenador terminó con código {code}; corpus rotado igualmente"),
        CycleOutcome::Completed {
            trainer: TrainerVerdict::TimedOut,
        } => "el entrenador excedió su límite de tiempo; corpus rotado igualmente".into(),
        CycleOutcome::Aborted(reason) => format!("ciclo abortado: {reason}"),
    }
}
