pub mod audio;
pub mod cli;
pub mod clock;
pub mod config;
pub mod dashboard;
pub mod deck;
pub mod deferred;
pub mod entity;
pub mod focus;
pub mod journal;
pub mod models;
pub mod notes;
pub mod schedule;
pub mod store;
pub mod tasks;
pub mod terminal;
pub mod theme;
pub mod timer;
pub mod tracks;
pub mod utils;
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use config::Config;
pub use dashboard::Dashboard;
pub use models::{Flashcard, FocusSession, JournalEntry, Note, Task};
pub use store::{KeyValueStore, MemoryStore, SqliteStore};
pub use utils::Profile;
