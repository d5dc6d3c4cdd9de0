use std::io::{self, Write};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::thread_rng;
use thiserror::Error;

use crate::dashboard::Dashboard;
use crate::deck::DeckView;
use crate::entity::SaveMode;
use crate::focus::HISTORY_LIMIT;
use crate::models::{FlashcardDraft, Mood, NoteDraft, Priority, Subject, TaskDraft};
use crate::schedule::{DAYS, day_index};
use crate::tasks::StatusFilter;
use crate::terminal::{self, RawModeGuard, TickSchedule};
use crate::timer::Phase;
use crate::tracks::TrackError;
use crate::utils::{format_stopwatch, format_total, preview};
use crate::validation::ValidationError;

/// Interval between timer ticks in the interactive loops
const TICK: Duration = Duration::from_secs(1);
/// Longest wait for a key in the note writer while no auto-save is pending
const IDLE_WAIT: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[command(name = "studydash")]
#[command(about = "Study dashboard - tasks, notes, flashcards, timers and a mood journal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/database)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage the task list
    #[command(subcommand)]
    Task(TaskCommand),
    /// Manage notes
    #[command(subcommand)]
    Note(NoteCommand),
    /// Manage and study flashcards
    #[command(subcommand)]
    Card(CardCommand),
    /// Daily mood and journal
    #[command(subcommand)]
    Journal(JournalCommand),
    /// Weekly schedule grid
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    /// Run the focus stopwatch until a key is pressed
    Focus,
    /// Show focus totals and recent sessions
    FocusStats,
    /// Run the Pomodoro timer interactively
    Pomodoro {
        /// Work phase length in minutes
        #[arg(long)]
        work: Option<u32>,
        /// Break phase length in minutes
        #[arg(long = "break")]
        break_minutes: Option<u32>,
    },
    /// Preview an ambient track (1-based number; omit to list tracks)
    Play {
        track: Option<usize>,
        /// Volume 0-100
        #[arg(long)]
        volume: Option<i32>,
    },
    /// Show or toggle the light/dark theme
    #[command(subcommand)]
    Theme(ThemeCommand),
}

#[derive(Subcommand)]
pub enum TaskCommand {
    /// Add a task
    Add {
        title: String,
        #[arg(long, value_enum, default_value_t = Subject::Other)]
        subject: Subject,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
    },
    /// List tasks
    List {
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        #[arg(long, value_enum)]
        subject: Option<Subject>,
    },
    /// Mark a task done, or not done
    Toggle { id: u64 },
    /// Change a task's fields
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_enum)]
        subject: Option<Subject>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
    },
    /// Delete a task
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Add a note
    Add {
        title: String,
        #[arg(long, default_value = "")]
        content: String,
        #[arg(long, value_enum, default_value_t = Subject::Other)]
        subject: Subject,
    },
    /// List notes, optionally filtered by title
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Print one note in full
    Show { id: u64 },
    /// Replace a note's fields
    Edit {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long, value_enum)]
        subject: Option<Subject>,
    },
    /// Append text to a note interactively; saved after a pause in typing
    Write { id: u64 },
    /// Delete a note
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum CardCommand {
    /// Add a flashcard
    Add {
        set: String,
        front: String,
        back: String,
        #[arg(long, value_enum, default_value_t = Subject::Other)]
        subject: Subject,
    },
    /// List flashcards
    List,
    /// Shuffle the deck
    Shuffle,
    /// Flip through the deck interactively
    Study,
    /// Delete a flashcard
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum JournalCommand {
    /// Write today's entry (replaces an earlier entry from today)
    Write {
        #[arg(default_value = "")]
        text: String,
        #[arg(long, value_enum)]
        mood: Option<Mood>,
    },
    /// Show today's entry
    Today,
    /// Search entries; an empty query lists everything
    Search {
        #[arg(default_value = "")]
        query: String,
    },
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// Set a slot, or clear it by passing an empty title
    Set {
        /// Day name or index (0 = Mon)
        day: String,
        /// Hour such as 14:00
        hour: String,
        #[arg(default_value = "")]
        title: String,
    },
    /// Print the weekly grid
    Show,
    /// Remove every entry
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ThemeCommand {
    /// Print the current theme
    Show,
    /// Switch between light and dark
    Toggle,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Track(#[from] TrackError),
    #[error("No {kind} with ID {id}")]
    NotFound { kind: &'static str, id: u64 },
    #[error("Invalid schedule slot: {0}")]
    InvalidSlot(String),
    #[error("Invalid track number: {0}")]
    InvalidTrack(usize),
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Dispatch a parsed subcommand
pub fn run(command: Commands, dashboard: &mut Dashboard) -> Result<(), CliError> {
    match command {
        Commands::Task(cmd) => handle_task(cmd, dashboard),
        Commands::Note(cmd) => handle_note(cmd, dashboard),
        Commands::Card(cmd) => handle_card(cmd, dashboard),
        Commands::Journal(cmd) => handle_journal(cmd, dashboard),
        Commands::Schedule(cmd) => handle_schedule(cmd, dashboard),
        Commands::Focus => run_focus(dashboard),
        Commands::FocusStats => {
            print_focus_stats(dashboard);
            Ok(())
        }
        Commands::Pomodoro {
            work,
            break_minutes,
        } => run_pomodoro(work, break_minutes, dashboard),
        Commands::Play { track, volume } => handle_play(track, volume, dashboard),
        Commands::Theme(cmd) => {
            let theme = match cmd {
                ThemeCommand::Show => dashboard.theme.get(),
                ThemeCommand::Toggle => dashboard.theme.toggle(),
            };
            println!("Theme: {}", theme.label());
            Ok(())
        }
    }
}

/// Overview printed when no subcommand is given
pub fn print_summary(dashboard: &Dashboard) {
    let summary = dashboard.summary();
    println!("Tasks:      {} open, {} done", summary.open_tasks, summary.completed_tasks);
    println!("Notes:      {}", summary.notes);
    println!("Flashcards: {}", summary.flashcards);
    println!("Schedule:   {} slots planned", summary.scheduled_slots);
    println!("Focus:      {} today", format_total(summary.focus_today_ms));
    match summary.today_mood {
        Some(mood) => println!("Mood:       {}", mood.symbol()),
        None => println!("Mood:       not logged today"),
    }
    println!("Theme:      {}", summary.theme.label());
}

pub fn handle_task(cmd: TaskCommand, dashboard: &mut Dashboard) -> Result<(), CliError> {
    let now = dashboard.now();
    match cmd {
        TaskCommand::Add {
            title,
            subject,
            priority,
        } => {
            let draft = TaskDraft::new(title, subject, priority);
            if let Some(id) = dashboard.tasks.save(SaveMode::Create, draft, now)? {
                println!("Task created successfully (ID: {})", id);
            }
        }
        TaskCommand::List { status, subject } => {
            let tasks = dashboard.tasks.filtered(status, subject);
            if tasks.is_empty() {
                println!("No tasks found");
            }
            for task in tasks {
                println!(
                    "{:>3} [{}] {} ({}, {})",
                    task.id,
                    if task.completed { "x" } else { " " },
                    task.title,
                    task.subject.label(),
                    task.priority.label()
                );
            }
        }
        TaskCommand::Toggle { id } => {
            if !dashboard.tasks.toggle(id, now) {
                return Err(CliError::NotFound { kind: "task", id });
            }
            println!("Task {} toggled", id);
        }
        TaskCommand::Edit {
            id,
            title,
            subject,
            priority,
        } => {
            let task = dashboard
                .tasks
                .find(id)
                .ok_or(CliError::NotFound { kind: "task", id })?;
            let draft = TaskDraft::new(
                title.unwrap_or_else(|| task.title.clone()),
                subject.unwrap_or(task.subject),
                priority.unwrap_or(task.priority),
            );
            dashboard.tasks.save(SaveMode::Edit(id), draft, now)?;
            println!("Task {} updated", id);
        }
        TaskCommand::Delete { id, yes } => {
            let task = dashboard
                .tasks
                .find(id)
                .ok_or(CliError::NotFound { kind: "task", id })?;
            let question = format!("Delete task \"{}\"?", task.title);
            if approve(yes, &question)? && dashboard.tasks.delete(id) {
                println!("Task {} deleted", id);
            }
        }
    }
    Ok(())
}

pub fn handle_note(cmd: NoteCommand, dashboard: &mut Dashboard) -> Result<(), CliError> {
    let now = dashboard.now();
    match cmd {
        NoteCommand::Add {
            title,
            content,
            subject,
        } => {
            let id = dashboard.notes.create_blank(now)?;
            dashboard
                .notes
                .save(id, NoteDraft::new(title, content, subject), now);
            println!("Note created successfully (ID: {})", id);
        }
        NoteCommand::List { search } => {
            let notes = dashboard.notes.search(search.as_deref().unwrap_or(""));
            if notes.is_empty() {
                println!("No notes found");
            }
            for note in notes {
                println!(
                    "{:>3} {} [{}] {}",
                    note.id,
                    note.title,
                    note.subject.label(),
                    preview(&note.content.replace('\n', " "), 40)
                );
            }
        }
        NoteCommand::Show { id } => {
            let note = dashboard
                .notes
                .select(id, now)
                .ok_or(CliError::NotFound { kind: "note", id })?;
            println!("# {} ({})", note.title, note.subject.label());
            println!(
                "Last modified {}",
                note.last_modified.format("%Y-%m-%d %H:%M")
            );
            println!();
            println!("{}", note.content);
        }
        NoteCommand::Edit {
            id,
            title,
            content,
            subject,
        } => {
            let note = dashboard
                .notes
                .select(id, now)
                .ok_or(CliError::NotFound { kind: "note", id })?;
            let draft = NoteDraft::new(
                title.unwrap_or_else(|| note.title.clone()),
                content.unwrap_or_else(|| note.content.clone()),
                subject.unwrap_or(note.subject),
            );
            dashboard.notes.save_current(draft, now);
            println!("Note {} updated", id);
        }
        NoteCommand::Write { id } => run_note_writer(id, dashboard)?,
        NoteCommand::Delete { id, yes } => {
            let note = dashboard
                .notes
                .notes()
                .iter()
                .find(|note| note.id == id)
                .ok_or(CliError::NotFound { kind: "note", id })?;
            let question = format!("Are you sure you want to delete \"{}\"?", note.title);
            if approve(yes, &question)? && dashboard.notes.delete(id) {
                println!("Note {} deleted", id);
            }
        }
    }
    Ok(())
}

pub fn handle_card(cmd: CardCommand, dashboard: &mut Dashboard) -> Result<(), CliError> {
    let now = dashboard.now();
    match cmd {
        CardCommand::Add {
            set,
            front,
            back,
            subject,
        } => {
            let draft = FlashcardDraft::new(set, front, back, subject);
            if let Some(id) = dashboard.deck.save(SaveMode::Create, draft, now)? {
                println!("Flashcard created successfully (ID: {})", id);
            }
        }
        CardCommand::List => print_cards(dashboard),
        CardCommand::Shuffle => {
            dashboard.deck.shuffle(&mut thread_rng());
            print_cards(dashboard);
        }
        CardCommand::Study => run_study(dashboard)?,
        CardCommand::Delete { id, yes } => {
            let card = dashboard
                .deck
                .cards()
                .iter()
                .find(|card| card.id == id)
                .ok_or(CliError::NotFound { kind: "flashcard", id })?;
            let question = format!("Delete flashcard \"{}\"?", card.front);
            if approve(yes, &question)? && dashboard.deck.delete(id) {
                println!("Flashcard {} deleted", id);
            }
        }
    }
    Ok(())
}

fn print_cards(dashboard: &Dashboard) {
    if dashboard.deck.is_empty() {
        println!("No flashcards yet. Create your first set!");
        return;
    }
    for set in dashboard.deck.sets() {
        println!("{}", set);
        for card in dashboard.deck.cards().iter().filter(|c| c.set == set) {
            println!("  {:>3} {} -> {}", card.id, card.front, card.back);
        }
    }
}

pub fn handle_journal(cmd: JournalCommand, dashboard: &mut Dashboard) -> Result<(), CliError> {
    let now = dashboard.now();
    match cmd {
        JournalCommand::Write { text, mood } => {
            dashboard.journal.upsert_today(&text, mood, now)?;
            println!("Journal entry saved!");
        }
        JournalCommand::Today => match dashboard.journal.today_entry(now) {
            Some(entry) => println!("{} {}", entry.mood.symbol(), entry.text),
            None => println!("Nothing written today"),
        },
        JournalCommand::Search { query } => {
            let entries = dashboard.journal.search(&query);
            if entries.is_empty() {
                println!("No entries found");
            }
            for entry in entries {
                println!(
                    "{} {} {}",
                    entry.date.format("%Y-%m-%d"),
                    entry.mood.symbol(),
                    preview(&entry.text, 60)
                );
            }
        }
    }
    Ok(())
}

pub fn handle_schedule(cmd: ScheduleCommand, dashboard: &mut Dashboard) -> Result<(), CliError> {
    match cmd {
        ScheduleCommand::Set { day, hour, title } => {
            let index = day_index(&day)
                .ok_or_else(|| CliError::InvalidSlot(format!("{} {}", day, hour)))?;
            if !dashboard.schedule.set_slot(index, &hour, &title) {
                return Err(CliError::InvalidSlot(format!("{} {}", day, hour)));
            }
            println!("Schedule updated");
        }
        ScheduleCommand::Show => {
            print!("{:>6}", "");
            for day in DAYS {
                print!(" {:<12}", day);
            }
            println!();
            for row in dashboard.schedule.rows() {
                print!("{:>6}", row.hour);
                for cell in &row.cells {
                    print!(" {:<12}", preview(cell.as_deref().unwrap_or("-"), 12));
                }
                println!();
            }
        }
        ScheduleCommand::Clear { yes } => {
            if approve(yes, "Are you sure you want to clear the entire schedule?")? {
                dashboard.schedule.clear_all();
                println!("Schedule cleared");
            }
        }
    }
    Ok(())
}

fn handle_play(
    track: Option<usize>,
    volume: Option<i32>,
    dashboard: &mut Dashboard,
) -> Result<(), CliError> {
    let playlist = dashboard.tracks.tracks();
    let Some(number) = track else {
        for (i, track) in playlist.iter().enumerate() {
            println!("{}. {} ({})", i + 1, track.name, track.duration);
        }
        return Ok(());
    };
    if number == 0 || number > playlist.len() {
        return Err(CliError::InvalidTrack(number));
    }

    if let Some(volume) = volume {
        dashboard.set_volume(volume);
    }
    dashboard.select_track(number - 1);
    dashboard.toggle_playback()?;
    if let Some(current) = dashboard.tracks.current() {
        println!(
            "Playing {} at volume {}. Press any key to stop.",
            current.name,
            dashboard.tracks.volume()
        );
    }
    let mut guard = RawModeGuard::new()?;
    terminal::wait_for_key()?;
    guard.restore()?;
    dashboard.stop_track();
    Ok(())
}

fn print_focus_stats(dashboard: &Dashboard) {
    let view = dashboard.focus.view(dashboard.now());
    println!("Today:     {}", view.today_total);
    println!("This week: {}", view.week_total);
    let recent = dashboard.focus.recent(HISTORY_LIMIT);
    if recent.is_empty() {
        println!("No focus sessions yet");
        return;
    }
    println!("Recent sessions:");
    for session in recent {
        println!(
            "  {} {} {}",
            session.date.format("%Y-%m-%d %H:%M"),
            format_stopwatch(session.duration_ms),
            session.subject
        );
    }
}

/// Skip the question when `--yes` was given
fn approve(yes: bool, question: &str) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut guard = RawModeGuard::new()?;
    let key = terminal::wait_for_key()?;
    guard.restore()?;

    let accepted = accepts(&key);
    println!("{}", if accepted { "y" } else { "n" });
    if !accepted {
        println!("Cancelled");
    }
    Ok(accepted)
}

fn accepts(key: &KeyEvent) -> bool {
    !key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y'))
}

#[derive(Debug, PartialEq, Eq)]
enum PomodoroAction {
    Toggle,
    Reset,
    /// Change the work length by this many minutes
    Work(i32),
    /// Change the break length by this many minutes
    Break(i32),
    Quit,
}

fn pomodoro_action(key: &KeyEvent) -> Option<PomodoroAction> {
    if terminal::is_interrupt(key) {
        return Some(PomodoroAction::Quit);
    }
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('s') | KeyCode::Enter => Some(PomodoroAction::Toggle),
        KeyCode::Char('r') => Some(PomodoroAction::Reset),
        KeyCode::Up | KeyCode::Char('+') => Some(PomodoroAction::Work(1)),
        KeyCode::Down | KeyCode::Char('-') => Some(PomodoroAction::Work(-1)),
        KeyCode::Right | KeyCode::Char(']') => Some(PomodoroAction::Break(1)),
        KeyCode::Left | KeyCode::Char('[') => Some(PomodoroAction::Break(-1)),
        KeyCode::Char('q') | KeyCode::Esc => Some(PomodoroAction::Quit),
        _ => None,
    }
}

/// Phase lengths never drop below one minute from the keyboard
fn adjust_minutes(current: u32, by: i32) -> u32 {
    current.saturating_add_signed(by).max(1)
}

fn run_pomodoro(
    work: Option<u32>,
    break_minutes: Option<u32>,
    dashboard: &mut Dashboard,
) -> Result<(), CliError> {
    if let Some(minutes) = work {
        dashboard.pomodoro.set_work_duration(minutes);
    }
    if let Some(minutes) = break_minutes {
        dashboard.pomodoro.set_break_duration(minutes);
    }
    println!(
        "space: start/pause   r: reset   up/down: work length   left/right: break length   q: quit"
    );

    let mut guard = RawModeGuard::hidden_cursor()?;
    dashboard.pomodoro.start();
    let mut schedule = TickSchedule::starting_at(TICK, Instant::now());
    loop {
        terminal::redraw(&pomodoro_status(dashboard))?;

        if let Some(key) = terminal::next_key(schedule.timeout(Instant::now()))? {
            match pomodoro_action(&key) {
                Some(PomodoroAction::Toggle) => {
                    dashboard.pomodoro.toggle();
                    // a resumed countdown waits a full second before its next tick
                    schedule = TickSchedule::starting_at(TICK, Instant::now());
                }
                Some(PomodoroAction::Reset) => dashboard.pomodoro.reset(),
                Some(PomodoroAction::Work(by)) => {
                    let minutes = adjust_minutes(dashboard.pomodoro.work_minutes(), by);
                    dashboard.pomodoro.set_work_duration(minutes);
                }
                Some(PomodoroAction::Break(by)) => {
                    let minutes = adjust_minutes(dashboard.pomodoro.break_minutes(), by);
                    dashboard.pomodoro.set_break_duration(minutes);
                }
                Some(PomodoroAction::Quit) => break,
                None => {}
            }
        }

        for _ in 0..schedule.take_due(Instant::now()) {
            if let Some(done) = dashboard.tick_pomodoro() {
                terminal::print_line(done.message)?;
                if done.next == Phase::Work {
                    let sessions = dashboard.pomodoro.sessions_completed();
                    terminal::print_line(&format!("Sessions completed: {}", sessions))?;
                }
            }
        }
    }

    terminal::print_line(&pomodoro_status(dashboard))?;
    guard.restore()?;
    Ok(())
}

fn pomodoro_status(dashboard: &Dashboard) -> String {
    let view = dashboard.pomodoro.view();
    format!(
        "{} {:<12} {:>3.0}%  {} sessions  {}/{} min {}",
        view.display,
        view.phase,
        view.progress * 100.0,
        view.sessions_completed,
        dashboard.pomodoro.work_minutes(),
        dashboard.pomodoro.break_minutes(),
        if view.running { "" } else { "(paused)" }
    )
}

fn run_focus(dashboard: &mut Dashboard) -> Result<(), CliError> {
    if !dashboard.start_focus() {
        return Ok(());
    }
    if let Some(started) = dashboard.focus.start_time() {
        println!(
            "Focus session started at {}. Press any key to stop.",
            started.format("%H:%M")
        );
    }

    let mut guard = RawModeGuard::hidden_cursor()?;
    let mut schedule = TickSchedule::starting_at(TICK, Instant::now());
    terminal::redraw(&format_stopwatch(0))?;
    loop {
        if terminal::next_key(schedule.timeout(Instant::now()))?.is_some() {
            break;
        }
        if schedule.take_due(Instant::now()) > 0 {
            let elapsed = dashboard.tick_focus();
            terminal::redraw(&format_stopwatch(elapsed))?;
        }
    }
    terminal::print_line(&format_stopwatch(dashboard.tick_focus()))?;
    guard.restore()?;

    if let Some(session) = dashboard.stop_focus() {
        println!("Recorded {}", format_stopwatch(session.duration_ms));
    }
    print_focus_stats(dashboard);
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum WriterKey {
    Edited,
    Ignored,
    Finished,
}

/// Apply one key press to the text typed in this writing session
fn apply_writer_key(key: &KeyEvent, typed: &mut String) -> WriterKey {
    if terminal::is_interrupt(key) {
        return WriterKey::Finished;
    }
    match key.code {
        KeyCode::Esc => WriterKey::Finished,
        KeyCode::Enter => {
            typed.push('\n');
            WriterKey::Edited
        }
        // erasing stops at the start of the current line
        KeyCode::Backspace if typed.is_empty() || typed.ends_with('\n') => WriterKey::Ignored,
        KeyCode::Backspace => {
            typed.pop();
            WriterKey::Edited
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            typed.push(c);
            WriterKey::Edited
        }
        _ => WriterKey::Ignored,
    }
}

/// Note content with the session's typing appended on a new line
fn appended(base: &str, typed: &str) -> String {
    if base.is_empty() || typed.is_empty() {
        format!("{}{}", base, typed)
    } else {
        format!("{}\n{}", base, typed)
    }
}

fn current_line(typed: &str) -> &str {
    typed.rsplit('\n').next().unwrap_or("")
}

fn run_note_writer(id: u64, dashboard: &mut Dashboard) -> Result<(), CliError> {
    let now = dashboard.now();
    let note = dashboard
        .notes
        .select(id, now)
        .ok_or(CliError::NotFound { kind: "note", id })?;
    let base = note.content.clone();
    let mut draft = NoteDraft::new(note.title.clone(), base.clone(), note.subject);
    println!("Writing to \"{}\". Typing is appended; Esc finishes.", draft.title);
    if !base.is_empty() {
        println!("{}", base);
    }

    let mut guard = RawModeGuard::new()?;
    let mut typed = String::new();
    loop {
        let timeout = dashboard
            .notes
            .autosave_deadline()
            .map_or(IDLE_WAIT, |due| due.saturating_duration_since(Instant::now()));

        if let Some(key) = terminal::next_key(timeout)? {
            let line_before = current_line(&typed).to_string();
            match apply_writer_key(&key, &mut typed) {
                WriterKey::Finished => break,
                WriterKey::Ignored => {}
                WriterKey::Edited => {
                    draft.content = appended(&base, &typed);
                    dashboard.notes.edit(draft.clone(), Instant::now());
                    if key.code == KeyCode::Enter {
                        terminal::print_line(&line_before)?;
                    } else {
                        terminal::redraw(current_line(&typed))?;
                    }
                }
            }
        }

        if dashboard.poll_autosave(Instant::now()) {
            terminal::annotate("  (saved)")?;
        }
    }
    terminal::print_line(current_line(&typed))?;
    guard.restore()?;

    let now = dashboard.now();
    dashboard.notes.save_current(draft, now);
    println!("Note {} saved", id);
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum StudyAction {
    Flip,
    Next,
    Previous,
    Quit,
}

fn study_action(key: &KeyEvent) -> Option<StudyAction> {
    if terminal::is_interrupt(key) {
        return Some(StudyAction::Quit);
    }
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter | KeyCode::Char('f') => Some(StudyAction::Flip),
        KeyCode::Right | KeyCode::Char('n') => Some(StudyAction::Next),
        KeyCode::Left | KeyCode::Char('p') => Some(StudyAction::Previous),
        KeyCode::Char('q') | KeyCode::Esc => Some(StudyAction::Quit),
        _ => None,
    }
}

fn card_line(view: &DeckView) -> String {
    match view {
        DeckView::Empty => "No flashcards yet. Create your first set!".to_string(),
        DeckView::Card(card) => format!(
            "[{}/{}] {} ({}) {}: {}",
            card.position,
            card.total,
            card.set,
            card.subject.label(),
            if card.flipped { "Answer" } else { "Question" },
            card.face
        ),
    }
}

fn run_study(dashboard: &mut Dashboard) -> Result<(), CliError> {
    if dashboard.deck.is_empty() {
        println!("{}", card_line(&DeckView::Empty));
        return Ok(());
    }
    println!("space: flip   n/right: next   p/left: previous   q: quit");

    let mut guard = RawModeGuard::hidden_cursor()?;
    loop {
        terminal::redraw(&card_line(&dashboard.deck.view()))?;
        match study_action(&terminal::wait_for_key()?) {
            Some(StudyAction::Flip) => dashboard.deck.flip(),
            Some(StudyAction::Next) => dashboard.deck.next_card(),
            Some(StudyAction::Previous) => dashboard.deck.previous_card(),
            Some(StudyAction::Quit) => break,
            None => {}
        }
    }
    terminal::print_line(&card_line(&dashboard.deck.view()))?;
    guard.restore()?;
    Ok(())
}
