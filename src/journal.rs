use chrono::{DateTime, Local};

use crate::models::{JournalEntry, Mood};
use crate::store::{Persistence, keys};
use crate::utils::contains_ignore_case;
use crate::validation::ValidationError;

/// Daily mood and journal log, newest entry first, one entry per calendar day
pub struct JournalLog {
    entries: Vec<JournalEntry>,
    persistence: Persistence,
}

impl JournalLog {
    pub fn load(persistence: Persistence) -> Self {
        let entries = persistence.load(keys::JOURNAL_ENTRIES).unwrap_or_default();
        Self {
            entries,
            persistence,
        }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Write today's entry, replacing one already made today.
    ///
    /// An unset mood is stored as neutral.
    pub fn upsert_today(
        &mut self,
        text: &str,
        mood: Option<Mood>,
        now: DateTime<Local>,
    ) -> Result<(), ValidationError> {
        let text = text.trim();
        if text.is_empty() && mood.is_none() {
            return Err(ValidationError::EmptyJournalEntry);
        }

        let entry = JournalEntry {
            date: now,
            text: text.to_string(),
            mood: mood.unwrap_or_default(),
        };

        let today = now.date_naive();
        match self.entries.iter().position(|e| e.date.date_naive() == today) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.insert(0, entry),
        }
        self.persistence.save(keys::JOURNAL_ENTRIES, &self.entries);
        Ok(())
    }

    /// The entry written on the same local day as `now`, for pre-filling the editor
    pub fn today_entry(&self, now: DateTime<Local>) -> Option<&JournalEntry> {
        let today = now.date_naive();
        self.entries.iter().find(|e| e.date.date_naive() == today)
    }

    /// Entries whose text contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<&JournalEntry> {
        self.entries
            .iter()
            .filter(|e| contains_ignore_case(&e.text, query))
            .collect()
    }
}
