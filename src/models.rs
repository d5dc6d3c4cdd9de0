use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::store::keys;
use crate::validation::{ValidationError, require};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum)]
pub enum Subject {
    Math,
    Science,
    English,
    History,
    Art,
    #[default]
    Other,
}

impl Subject {
    pub fn label(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::English => "English",
            Subject::History => "History",
            Subject::Art => "Art",
            Subject::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// The eight journal moods, stored as their symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Mood {
    #[serde(rename = "😊")]
    Happy,
    #[default]
    #[serde(rename = "😐")]
    Neutral,
    #[serde(rename = "😔")]
    Sad,
    #[serde(rename = "😡")]
    Angry,
    #[serde(rename = "😴")]
    Sleepy,
    #[serde(rename = "🤔")]
    Thinking,
    #[serde(rename = "😎")]
    Cool,
    #[serde(rename = "🥳")]
    Party,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Neutral,
        Mood::Sad,
        Mood::Angry,
        Mood::Sleepy,
        Mood::Thinking,
        Mood::Cool,
        Mood::Party,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Neutral => "😐",
            Mood::Sad => "😔",
            Mood::Angry => "😡",
            Mood::Sleepy => "😴",
            Mood::Thinking => "🤔",
            Mood::Cool => "😎",
            Mood::Party => "🥳",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub subject: Subject,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Local>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub subject: Subject,
    pub priority: Priority,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>, subject: Subject, priority: Priority) -> Self {
        Self {
            title: title.into(),
            subject,
            priority,
        }
    }
}

/// Partial update; `None` leaves the field as it is
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub subject: Option<Subject>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl From<TaskDraft> for TaskPatch {
    fn from(draft: TaskDraft) -> Self {
        Self {
            title: Some(draft.title),
            subject: Some(draft.subject),
            priority: Some(draft.priority),
            completed: None,
        }
    }
}

impl Entity for Task {
    const LIST_KEY: &'static str = keys::TASKS;
    const COUNTER_KEY: &'static str = keys::TASK_ID_COUNTER;
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    fn validate(draft: &TaskDraft) -> Result<(), ValidationError> {
        require("task title", &draft.title)
    }

    fn validate_patch(patch: &TaskPatch) -> Result<(), ValidationError> {
        match &patch.title {
            Some(title) => require("task title", title),
            None => Ok(()),
        }
    }

    fn build(id: u64, draft: TaskDraft, now: DateTime<Local>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            subject: draft.subject,
            priority: draft.priority,
            completed: false,
            created_at: now,
        }
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn apply(&mut self, patch: TaskPatch, _now: DateTime<Local>) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(subject) = patch.subject {
            self.subject = subject;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub subject: Subject,
    pub date: DateTime<Local>,
    pub last_modified: DateTime<Local>,
}

/// Editor contents for a note; also used as the full-replacement patch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub subject: Subject,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>, subject: Subject) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            subject,
        }
    }

    pub fn blank() -> Self {
        Self::new("New Note", "", Subject::Other)
    }
}

fn note_title(title: &str) -> String {
    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title.to_string()
    }
}

impl Entity for Note {
    const LIST_KEY: &'static str = keys::NOTES;
    const COUNTER_KEY: &'static str = keys::NOTE_ID_COUNTER;
    type Draft = NoteDraft;
    type Patch = NoteDraft;

    fn validate(_draft: &NoteDraft) -> Result<(), ValidationError> {
        Ok(())
    }

    fn build(id: u64, draft: NoteDraft, now: DateTime<Local>) -> Self {
        Self {
            id,
            title: note_title(&draft.title),
            content: draft.content,
            subject: draft.subject,
            date: now,
            last_modified: now,
        }
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn apply(&mut self, patch: NoteDraft, now: DateTime<Local>) {
        self.title = note_title(&patch.title);
        self.content = patch.content;
        self.subject = patch.subject;
        self.last_modified = now;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: u64,
    pub set: String,
    pub front: String,
    pub back: String,
    pub subject: Subject,
    #[serde(default)]
    pub correct: u32,
    #[serde(default)]
    pub wrong: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDraft {
    pub set: String,
    pub front: String,
    pub back: String,
    pub subject: Subject,
}

impl FlashcardDraft {
    pub fn new(
        set: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
        subject: Subject,
    ) -> Self {
        Self {
            set: set.into(),
            front: front.into(),
            back: back.into(),
            subject,
        }
    }
}

impl Entity for Flashcard {
    const LIST_KEY: &'static str = keys::FLASHCARDS;
    const COUNTER_KEY: &'static str = keys::FLASHCARD_ID_COUNTER;
    type Draft = FlashcardDraft;
    type Patch = FlashcardDraft;

    fn validate(draft: &FlashcardDraft) -> Result<(), ValidationError> {
        require("set name", &draft.set)?;
        require("front text", &draft.front)?;
        require("back text", &draft.back)
    }

    fn validate_patch(patch: &FlashcardDraft) -> Result<(), ValidationError> {
        Self::validate(patch)
    }

    fn build(id: u64, draft: FlashcardDraft, _now: DateTime<Local>) -> Self {
        Self {
            id,
            set: draft.set.trim().to_string(),
            front: draft.front.trim().to_string(),
            back: draft.back.trim().to_string(),
            subject: draft.subject,
            correct: 0,
            wrong: 0,
        }
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn apply(&mut self, patch: FlashcardDraft, _now: DateTime<Local>) {
        self.set = patch.set.trim().to_string();
        self.front = patch.front.trim().to_string();
        self.back = patch.back.trim().to_string();
        self.subject = patch.subject;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    pub date: DateTime<Local>,
    #[serde(alias = "duration")]
    pub duration_ms: u64,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub date: DateTime<Local>,
    pub text: String,
    pub mood: Mood,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub title: String,
    pub subject: Subject,
}
