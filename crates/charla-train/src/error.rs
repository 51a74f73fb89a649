use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] charla_core::CoreError),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
}
