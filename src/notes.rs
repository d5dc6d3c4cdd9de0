use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::deferred::DeferredCommit;
use crate::entity::EntityList;
use crate::models::{Note, NoteDraft};
use crate::store::Persistence;
use crate::utils::contains_ignore_case;
use crate::validation::ValidationError;

pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);

/// An edit waiting for the auto-save delay to pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub note_id: u64,
    pub draft: NoteDraft,
}

/// Note list plus the editor's current selection and auto-save slot
pub struct NoteEditor {
    notes: EntityList<Note>,
    current: Option<u64>,
    autosave: DeferredCommit<PendingEdit>,
}

impl NoteEditor {
    pub fn load(persistence: Persistence, autosave_delay: Duration) -> Self {
        Self {
            notes: EntityList::load(persistence),
            current: None,
            autosave: DeferredCommit::new(autosave_delay),
        }
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.items()
    }

    pub fn current(&self) -> Option<&Note> {
        self.current.and_then(|id| self.notes.find(id))
    }

    /// Create an empty "New Note" and open it in the editor
    pub fn create_blank(&mut self, now: DateTime<Local>) -> Result<u64, ValidationError> {
        self.commit_pending(now);
        let id = self.notes.create(NoteDraft::blank(), now)?;
        self.current = Some(id);
        Ok(id)
    }

    /// Open a note in the editor. A pending edit to the previous note is saved first.
    pub fn select(&mut self, id: u64, now: DateTime<Local>) -> Option<&Note> {
        if self.notes.find(id).is_none() {
            debug!(id, "select of missing note ignored");
            return None;
        }
        self.commit_pending(now);
        self.current = Some(id);
        self.notes.find(id)
    }

    /// Record an editor change; the commit happens once no edit has arrived for the delay
    pub fn edit(&mut self, draft: NoteDraft, at: Instant) {
        let Some(note_id) = self.current else {
            return;
        };
        self.autosave.schedule(at, PendingEdit { note_id, draft });
    }

    /// Commit the pending edit if its delay has elapsed. Returns `true` when something was saved.
    pub fn poll_autosave(&mut self, at: Instant, now: DateTime<Local>) -> bool {
        match self.autosave.poll(at) {
            Some(pending) => self.apply(pending, now),
            None => false,
        }
    }

    pub fn has_pending_edit(&self) -> bool {
        self.autosave.is_pending()
    }

    /// When the pending edit falls due, if there is one
    pub fn autosave_deadline(&self) -> Option<Instant> {
        self.autosave.deadline()
    }

    /// Explicit save of the current note; supersedes any pending auto-save
    pub fn save_current(&mut self, draft: NoteDraft, now: DateTime<Local>) -> bool {
        self.autosave.cancel();
        let Some(note_id) = self.current else {
            return false;
        };
        self.apply(PendingEdit { note_id, draft }, now)
    }

    /// Save an arbitrary note by id without changing the selection
    pub fn save(&mut self, note_id: u64, draft: NoteDraft, now: DateTime<Local>) -> bool {
        self.apply(PendingEdit { note_id, draft }, now)
    }

    pub fn delete(&mut self, id: u64) -> bool {
        if self.autosave_target() == Some(id) {
            self.autosave.cancel();
        }
        if self.current == Some(id) {
            self.current = None;
        }
        self.notes.delete(id)
    }

    /// Delete whatever note is open in the editor
    pub fn delete_current(&mut self) -> bool {
        match self.current {
            Some(id) => self.delete(id),
            None => false,
        }
    }

    /// Notes whose title contains `query`, ignoring case
    pub fn search(&self, query: &str) -> Vec<&Note> {
        self.notes.filter(|note| contains_ignore_case(&note.title, query))
    }

    pub fn seed(&mut self, notes: Vec<Note>) -> bool {
        self.notes.seed(notes)
    }

    fn autosave_target(&self) -> Option<u64> {
        self.autosave.peek().map(|pending| pending.note_id)
    }

    fn commit_pending(&mut self, now: DateTime<Local>) {
        if let Some(pending) = self.autosave.flush() {
            self.apply(pending, now);
        }
    }

    fn apply(&mut self, pending: PendingEdit, now: DateTime<Local>) -> bool {
        self.notes
            .update(pending.note_id, pending.draft, now)
            .unwrap_or(false)
    }
}
