use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid model artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unrecognized model artifact shape: {0}")]
    UnrecognizedShape(PathBuf),

    #[error("Artifact vocabulary size {vocab} does not match model state {model}")]
    VocabMismatch { model: usize, vocab: usize },

    #[error("Not enough training pairs: {pairs} (need at least {min})")]
    InsufficientData { pairs: usize, min: usize },
}
