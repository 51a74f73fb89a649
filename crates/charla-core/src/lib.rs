//! Corpus storage, accept policy, and dataset building for charla.
//!
//! Everything here is file-backed under a single data directory
//! ([`paths::ChatPaths`]): the conversation log, the flat training-pair
//! file, and the training log. Concurrent access from the request flow
//! and the training orchestrator is coordinated with `fs2` file locks;
//! request-side mutations are always appends.

pub mod corpus;
pub mod dataset;
pub mod error;
pub mod paths;
pub mod trainlog;

pub use corpus::{
    accepts, clean_files, CleanReport, ConversationRecord, CorpusStore, BOT_PREFIX, USER_PREFIX,
};
pub use dataset::{build_dataset, dataset_line_count};
pub use error::CoreError;
pub use paths::ChatPaths;
pub use trainlog::TrainLog;
