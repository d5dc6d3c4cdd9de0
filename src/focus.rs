use chrono::{DateTime, Duration, Local};
use serde::Serialize;
use tracing::{debug, info};

use crate::models::FocusSession;
use crate::store::{Persistence, keys};
use crate::utils::{format_stopwatch, format_total};

pub const DEFAULT_FOCUS_SUBJECT: &str = "General Study";
pub const HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusView {
    pub elapsed: String,
    pub today_total: String,
    pub week_total: String,
    pub running: bool,
}

/// Open-ended stopwatch whose intervals are recorded when stopped.
pub struct FocusTracker {
    running: bool,
    start_time: Option<DateTime<Local>>,
    elapsed_ms: u64,
    sessions: Vec<FocusSession>,
    persistence: Persistence,
}

fn millis_between(start: DateTime<Local>, end: DateTime<Local>) -> u64 {
    u64::try_from((end - start).num_milliseconds()).unwrap_or(0)
}

impl FocusTracker {
    pub fn load(persistence: Persistence) -> Self {
        let sessions = persistence.load(keys::FOCUS_SESSIONS).unwrap_or_default();
        Self {
            running: false,
            start_time: None,
            elapsed_ms: 0,
            sessions,
            persistence,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn start_time(&self) -> Option<DateTime<Local>> {
        self.start_time
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn sessions(&self) -> &[FocusSession] {
        &self.sessions
    }

    /// Begin timing. Returns `false` if a session is already running.
    pub fn start(&mut self, now: DateTime<Local>) -> bool {
        if self.running {
            debug!("focus session already running");
            return false;
        }
        self.running = true;
        self.start_time = Some(now);
        self.elapsed_ms = 0;
        true
    }

    /// Refresh the elapsed time while running
    pub fn tick(&mut self, now: DateTime<Local>) -> u64 {
        if let (true, Some(start)) = (self.running, self.start_time) {
            self.elapsed_ms = millis_between(start, now);
        }
        self.elapsed_ms
    }

    /// Stop timing and record the session. Returns `None` if nothing was running.
    pub fn stop(&mut self, now: DateTime<Local>) -> Option<FocusSession> {
        if !self.running {
            return None;
        }
        let start = self.start_time.take()?;
        self.running = false;
        self.elapsed_ms = 0;

        let session = FocusSession {
            date: now,
            duration_ms: millis_between(start, now),
            subject: DEFAULT_FOCUS_SUBJECT.to_string(),
        };
        info!(duration_ms = session.duration_ms, "focus session recorded");

        self.sessions.push(session.clone());
        self.persistence.save(keys::FOCUS_SESSIONS, &self.sessions);
        Some(session)
    }

    /// Total of sessions recorded on the same local calendar day as `now`
    pub fn today_total_ms(&self, now: DateTime<Local>) -> u64 {
        let today = now.date_naive();
        self.sessions
            .iter()
            .filter(|s| s.date.date_naive() == today)
            .map(|s| s.duration_ms)
            .sum()
    }

    /// Total of sessions in the rolling seven days ending at `now`
    pub fn week_total_ms(&self, now: DateTime<Local>) -> u64 {
        let cutoff = now - Duration::days(7);
        self.sessions
            .iter()
            .filter(|s| s.date >= cutoff)
            .map(|s| s.duration_ms)
            .sum()
    }

    /// Most recent sessions first
    pub fn recent(&self, limit: usize) -> Vec<&FocusSession> {
        self.sessions.iter().rev().take(limit).collect()
    }

    pub fn view(&self, now: DateTime<Local>) -> FocusView {
        FocusView {
            elapsed: format_stopwatch(self.elapsed_ms),
            today_total: format_total(self.today_total_ms(now)),
            week_total: format_total(self.week_total_ms(now)),
            running: self.running,
        }
    }
}
