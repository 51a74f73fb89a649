//! Model side of charla: vocabulary, persisted artifact, trainer, and the
//! response-sampling decoder.
//!
//! The decoder is the interesting part (see [`decoder::Decoder`]); the
//! sequence model behind it is deliberately minimal and hidden behind the
//! next-token-distribution contract in [`chain::ChainModel`].

pub mod artifact;
pub mod chain;
pub mod decoder;
pub mod error;
pub mod trainer;
pub mod vocab;

pub use artifact::ModelArtifact;
pub use chain::ChainModel;
pub use decoder::{Decoder, MAX_REPLY_WORDS};
pub use error::ModelError;
pub use trainer::{train, TrainSummary, MIN_TRAINING_PAIRS};
pub use vocab::{tokenize, Vocab, UNKNOWN_INDEX};
