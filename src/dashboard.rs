use std::rc::Rc;
use std::time::Instant;

use chrono::{DateTime, Local};
use tracing::info;

use crate::audio::AudioOutput;
use crate::clock::Clock;
use crate::config::Config;
use crate::deck::FlashcardDeck;
use crate::focus::FocusTracker;
use crate::journal::JournalLog;
use crate::models::{Flashcard, FocusSession, Mood, Note, Priority, Subject, Task};
use crate::notes::NoteEditor;
use crate::schedule::ScheduleGrid;
use crate::store::{KeyValueStore, Persistence};
use crate::tasks::TaskBoard;
use crate::theme::{Theme, ThemePreference};
use crate::timer::{CHIME_DURATION_MS, CHIME_FREQUENCY_HZ, PhaseComplete, PomodoroTimer};
use crate::tracks::{PlaybackState, TrackError, TrackSelector};

/// Counts shown when the binary runs without a subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub open_tasks: usize,
    pub completed_tasks: usize,
    pub notes: usize,
    pub flashcards: usize,
    pub scheduled_slots: usize,
    pub focus_today_ms: u64,
    pub today_mood: Option<Mood>,
    pub theme: Theme,
}

/// Every study module, each with its own handle on the shared store.
///
/// The modules are independent; the dashboard only supplies the clock and
/// the audio output they need.
pub struct Dashboard {
    pub theme: ThemePreference,
    pub tasks: TaskBoard,
    pub pomodoro: PomodoroTimer,
    pub focus: FocusTracker,
    pub schedule: ScheduleGrid,
    pub notes: NoteEditor,
    pub tracks: TrackSelector,
    pub deck: FlashcardDeck,
    pub journal: JournalLog,
    audio: Box<dyn AudioOutput>,
    clock: Rc<dyn Clock>,
}

impl Dashboard {
    pub fn new(
        config: &Config,
        store: Rc<dyn KeyValueStore>,
        audio: Box<dyn AudioOutput>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        let handle = |scope: &'static str| Persistence::new(Rc::clone(&store), scope);

        let mut dashboard = Self {
            theme: ThemePreference::load(handle("theme")),
            tasks: TaskBoard::load(handle("tasks")),
            pomodoro: PomodoroTimer::new(
                config.pomodoro.work_minutes,
                config.pomodoro.break_minutes,
            ),
            focus: FocusTracker::load(handle("focus")),
            schedule: ScheduleGrid::load(handle("schedule")),
            notes: NoteEditor::load(handle("notes"), config.autosave_delay()),
            tracks: TrackSelector::new(),
            deck: FlashcardDeck::load(handle("flashcards")),
            journal: JournalLog::load(handle("journal")),
            audio,
            clock,
        };

        if config.load_sample_data {
            dashboard.load_sample_data();
        }
        dashboard
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// One second of Pomodoro time. A finished phase sounds the chime.
    pub fn tick_pomodoro(&mut self) -> Option<PhaseComplete> {
        let completed = self.pomodoro.tick()?;
        self.audio.play_tone(CHIME_FREQUENCY_HZ, CHIME_DURATION_MS);
        info!(message = completed.message, "pomodoro phase complete");
        Some(completed)
    }

    pub fn start_focus(&mut self) -> bool {
        let now = self.now();
        self.focus.start(now)
    }

    pub fn tick_focus(&mut self) -> u64 {
        let now = self.now();
        self.focus.tick(now)
    }

    pub fn stop_focus(&mut self) -> Option<FocusSession> {
        let now = self.now();
        self.focus.stop(now)
    }

    /// Commit the note editor's pending edit once its delay has passed
    pub fn poll_autosave(&mut self, at: Instant) -> bool {
        let now = self.now();
        self.notes.poll_autosave(at, now)
    }

    pub fn select_track(&mut self, index: usize) {
        self.tracks.select(index, self.audio.as_mut());
    }

    pub fn toggle_playback(&mut self) -> Result<PlaybackState, TrackError> {
        self.tracks.toggle_playback(self.audio.as_mut())
    }

    pub fn stop_track(&mut self) {
        self.tracks.stop(self.audio.as_mut());
    }

    pub fn set_volume(&mut self, volume: i32) -> u8 {
        self.tracks.set_volume(volume, self.audio.as_mut())
    }

    /// Fill whichever of tasks, notes and flashcards are empty with starter records
    pub fn load_sample_data(&mut self) {
        let now = self.now();
        if self.tasks.seed(sample_tasks(now)) {
            info!("loaded sample tasks");
        }
        if self.notes.seed(sample_notes(now)) {
            info!("loaded sample notes");
        }
        if self.deck.seed(sample_flashcards()) {
            info!("loaded sample flashcards");
        }
    }

    pub fn summary(&self) -> Summary {
        let now = self.now();
        let completed_tasks = self.tasks.tasks().iter().filter(|t| t.completed).count();
        Summary {
            open_tasks: self.tasks.tasks().len() - completed_tasks,
            completed_tasks,
            notes: self.notes.notes().len(),
            flashcards: self.deck.len(),
            scheduled_slots: self.schedule.len(),
            focus_today_ms: self.focus.today_total_ms(now),
            today_mood: self.journal.today_entry(now).map(|e| e.mood),
            theme: self.theme.get(),
        }
    }
}

fn sample_tasks(now: DateTime<Local>) -> Vec<Task> {
    let task = |id, title: &str, subject, priority, completed| Task {
        id,
        title: title.to_string(),
        subject,
        priority,
        completed,
        created_at: now,
    };
    vec![
        task(1, "Complete Math Assignment", Subject::Math, Priority::High, false),
        task(2, "Read History Chapter 5", Subject::History, Priority::Medium, true),
        task(3, "Write English Essay", Subject::English, Priority::High, false),
    ]
}

fn sample_notes(now: DateTime<Local>) -> Vec<Note> {
    let note = |id, title: &str, content: &str, subject| Note {
        id,
        title: title.to_string(),
        content: content.to_string(),
        subject,
        date: now,
        last_modified: now,
    };
    vec![
        note(
            1,
            "Physics Formulas",
            "# Important Formulas\n\n- F = ma\n- E = mc²",
            Subject::Science,
        ),
        note(
            2,
            "Essay Outline",
            "## Introduction\n- Hook\n- Thesis statement",
            Subject::English,
        ),
    ]
}

fn sample_flashcards() -> Vec<Flashcard> {
    let card = |id, set: &str, front: &str, back: &str, subject| Flashcard {
        id,
        set: set.to_string(),
        front: front.to_string(),
        back: back.to_string(),
        subject,
        correct: 0,
        wrong: 0,
    };
    vec![
        card(1, "Math Basics", "What is 2 + 2?", "4", Subject::Math),
        card(2, "Math Basics", "What is 5 × 6?", "30", Subject::Math),
        card(3, "Science Facts", "What is H2O?", "Water", Subject::Science),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SaveMode;
    use crate::models::TaskDraft;
    use crate::store::{MemoryStore, keys};
    use crate::test_utils::{AudioCall, FailingStore, ManualClock, RecordingAudio, afternoon};
    use chrono::Duration;
    use serde_json::json;

    fn config(load_sample_data: bool) -> Config {
        Config {
            load_sample_data,
            ..Config::default()
        }
    }

    fn dashboard_on(
        store: Rc<dyn KeyValueStore>,
        cfg: &Config,
    ) -> (Dashboard, RecordingAudio, Rc<ManualClock>) {
        let audio = RecordingAudio::default();
        let clock = Rc::new(ManualClock::at(afternoon()));
        let dashboard = Dashboard::new(cfg, store, Box::new(audio.clone()), clock.clone());
        (dashboard, audio, clock)
    }

    #[test]
    fn test_sample_data_seeds_empty_lists_once() {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let (mut dashboard, _audio, _clock) = dashboard_on(Rc::clone(&store), &config(true));

        assert_eq!(dashboard.tasks.tasks().len(), 3);
        assert_eq!(dashboard.notes.notes().len(), 2);
        assert_eq!(dashboard.deck.len(), 3);
        assert_eq!(store.get(keys::TASK_ID_COUNTER).unwrap(), Some(json!(4)));
        assert_eq!(store.get(keys::NOTE_ID_COUNTER).unwrap(), Some(json!(3)));
        assert_eq!(store.get(keys::FLASHCARD_ID_COUNTER).unwrap(), Some(json!(4)));

        dashboard.tasks.delete(1);
        dashboard.load_sample_data();
        assert_eq!(dashboard.tasks.tasks().len(), 2);

        let (reopened, _audio, _clock) = dashboard_on(store, &config(true));
        assert_eq!(reopened.tasks.tasks().len(), 2);
    }

    #[test]
    fn test_sample_data_can_be_disabled() {
        let (dashboard, _audio, _clock) =
            dashboard_on(Rc::new(MemoryStore::new()), &config(false));
        assert!(dashboard.tasks.tasks().is_empty());
        assert!(dashboard.deck.is_empty());
    }

    #[test]
    fn test_pomodoro_completion_plays_chime() {
        let mut cfg = config(false);
        cfg.pomodoro.work_minutes = 1;
        let (mut dashboard, audio, _clock) = dashboard_on(Rc::new(MemoryStore::new()), &cfg);

        assert!(dashboard.tick_pomodoro().is_none());
        dashboard.pomodoro.start();
        let completions: Vec<PhaseComplete> =
            (0..60).filter_map(|_| dashboard.tick_pomodoro()).collect();

        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].message, "Work session complete! Time for a break.");
        assert_eq!(
            *audio.calls.borrow(),
            vec![AudioCall::Tone(CHIME_FREQUENCY_HZ, CHIME_DURATION_MS)]
        );
    }

    #[test]
    fn test_focus_uses_dashboard_clock() {
        let (mut dashboard, _audio, clock) =
            dashboard_on(Rc::new(MemoryStore::new()), &config(false));

        assert!(dashboard.start_focus());
        clock.advance(Duration::minutes(30));
        assert_eq!(dashboard.tick_focus(), 30 * 60 * 1000);

        let session = dashboard.stop_focus().unwrap();
        assert_eq!(session.duration_ms, 30 * 60 * 1000);
        assert_eq!(dashboard.summary().focus_today_ms, 30 * 60 * 1000);
    }

    #[test]
    fn test_failing_store_keeps_working_in_memory() {
        let (mut dashboard, _audio, _clock) = dashboard_on(Rc::new(FailingStore), &config(true));

        assert_eq!(dashboard.tasks.tasks().len(), 3);
        let now = dashboard.now();
        let id = dashboard
            .tasks
            .save(
                SaveMode::Create,
                TaskDraft::new("Lab report", Subject::Science, Priority::Low),
                now,
            )
            .unwrap();
        assert_eq!(id, Some(4));
        assert_eq!(dashboard.theme.toggle(), Theme::Dark);
        assert!(dashboard.journal.upsert_today("fine", None, afternoon()).is_ok());
    }

    #[test]
    fn test_track_wrappers_reach_audio() {
        let (mut dashboard, audio, _clock) =
            dashboard_on(Rc::new(MemoryStore::new()), &config(false));

        assert_eq!(dashboard.toggle_playback(), Err(TrackError::NoTrackSelected));
        dashboard.select_track(1);
        assert_eq!(dashboard.toggle_playback(), Ok(PlaybackState::Playing));
        assert_eq!(dashboard.set_volume(120), 100);
        dashboard.stop_track();

        assert_eq!(
            *audio.calls.borrow(),
            vec![AudioCall::Track(1), AudioCall::Volume(100), AudioCall::Stop]
        );
    }

    #[test]
    fn test_summary_counts() {
        let (mut dashboard, _audio, _clock) =
            dashboard_on(Rc::new(MemoryStore::new()), &config(true));
        dashboard.schedule.set_slot(0, "9:00", "Calculus");
        dashboard
            .journal
            .upsert_today("", Some(Mood::Party), afternoon())
            .unwrap();

        let summary = dashboard.summary();
        assert_eq!(summary.open_tasks, 2);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.notes, 2);
        assert_eq!(summary.flashcards, 3);
        assert_eq!(summary.scheduled_slots, 1);
        assert_eq!(summary.today_mood, Some(Mood::Party));
        assert_eq!(summary.theme, Theme::Light);
    }
}
