pub mod accept;
pub mod clean;
pub mod store;

pub use accept::accepts;
pub use clean::{clean_files, CleanReport};
pub use store::{ConversationRecord, CorpusStore, BOT_PREFIX, USER_PREFIX};
