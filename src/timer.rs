use serde::Serialize;

use crate::utils::format_countdown;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

/// Completion chime
pub const CHIME_FREQUENCY_HZ: u32 = 800;
pub const CHIME_DURATION_MS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Work,
    Break,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work Session",
            Phase::Break => "Break Time",
        }
    }
}

/// Emitted when a phase runs out. The timer is already paused in the next phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseComplete {
    pub finished: Phase,
    pub next: Phase,
    pub message: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PomodoroView {
    pub display: String,
    pub phase: &'static str,
    pub sessions_completed: u32,
    pub progress: f64,
    pub running: bool,
}

/// Work/break countdown.
///
/// The timer has no clock of its own: the driver calls [`tick`](Self::tick)
/// once per second, and ticks that arrive while paused are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct PomodoroTimer {
    running: bool,
    phase: Phase,
    time_left: u32,
    work_minutes: u32,
    break_minutes: u32,
    sessions_completed: u32,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_WORK_MINUTES, DEFAULT_BREAK_MINUTES)
    }
}

impl PomodoroTimer {
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        Self {
            running: false,
            phase: Phase::Work,
            time_left: work_minutes.saturating_mul(60),
            work_minutes,
            break_minutes,
            sessions_completed: 0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_work_session(&self) -> bool {
        self.phase == Phase::Work
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Start when paused, pause when running
    pub fn toggle(&mut self) {
        self.running = !self.running;
    }

    /// Back to a paused work phase. The session count is kept.
    pub fn reset(&mut self) {
        self.running = false;
        self.phase = Phase::Work;
        self.time_left = self.phase_seconds(Phase::Work);
    }

    /// Advance the countdown by one second
    pub fn tick(&mut self) -> Option<PhaseComplete> {
        if !self.running {
            return None;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            return Some(self.complete());
        }
        None
    }

    fn complete(&mut self) -> PhaseComplete {
        self.running = false;
        let finished = self.phase;

        let message = match finished {
            Phase::Work => {
                self.sessions_completed += 1;
                self.phase = Phase::Break;
                "Work session complete! Time for a break."
            }
            Phase::Break => {
                self.phase = Phase::Work;
                "Break complete! Ready for another work session?"
            }
        };
        self.time_left = self.phase_seconds(self.phase);

        PhaseComplete {
            finished,
            next: self.phase,
            message,
        }
    }

    pub fn set_work_duration(&mut self, minutes: u32) {
        self.work_minutes = minutes;
        if !self.running && self.phase == Phase::Work {
            self.time_left = self.phase_seconds(Phase::Work);
        }
    }

    pub fn set_break_duration(&mut self, minutes: u32) {
        self.break_minutes = minutes;
        if !self.running && self.phase == Phase::Break {
            self.time_left = self.phase_seconds(Phase::Break);
        }
    }

    fn phase_seconds(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_minutes.saturating_mul(60),
            Phase::Break => self.break_minutes.saturating_mul(60),
        }
    }

    /// Elapsed fraction of the current phase, in [0, 1]
    pub fn progress(&self) -> f64 {
        let total = self.phase_seconds(self.phase);
        if total == 0 {
            return 0.0;
        }
        let elapsed = f64::from(total) - f64::from(self.time_left);
        (elapsed / f64::from(total)).clamp(0.0, 1.0)
    }

    pub fn view(&self) -> PomodoroView {
        PomodoroView {
            display: format_countdown(self.time_left),
            phase: self.phase.label(),
            sessions_completed: self.sessions_completed,
            progress: self.progress(),
            running: self.running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let timer = PomodoroTimer::default();
        assert!(!timer.is_running());
        assert!(timer.is_work_session());
        assert_eq!(timer.time_left(), 1500);
        assert_eq!(timer.sessions_completed(), 0);
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn test_ticks_ignored_while_paused() {
        let mut timer = PomodoroTimer::default();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.time_left(), 1500);

        timer.start();
        timer.tick();
        timer.pause();
        timer.tick();
        assert_eq!(timer.time_left(), 1499);
    }

    #[test]
    fn test_full_work_session_completes_once() {
        let mut timer = PomodoroTimer::new(25, 5);
        timer.start();

        let completions: Vec<PhaseComplete> = (0..1500).filter_map(|_| timer.tick()).collect();

        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].finished, Phase::Work);
        assert_eq!(completions[0].next, Phase::Break);
        assert_eq!(completions[0].message, "Work session complete! Time for a break.");
        assert!(!timer.is_running());
        assert!(!timer.is_work_session());
        assert_eq!(timer.time_left(), 5 * 60);
        assert_eq!(timer.sessions_completed(), 1);

        // paused in the new phase until started again
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.time_left(), 300);
    }

    #[test]
    fn test_break_completion_returns_to_work_without_counting() {
        let mut timer = PomodoroTimer::new(1, 1);
        timer.start();
        (0..60).for_each(|_| {
            timer.tick();
        });
        timer.start();
        let done: Vec<_> = (0..60).filter_map(|_| timer.tick()).collect();

        assert_eq!(done.len(), 1);
        assert_eq!(done[0].finished, Phase::Break);
        assert!(timer.is_work_session());
        assert_eq!(timer.time_left(), 60);
        assert_eq!(timer.sessions_completed(), 1);
    }

    #[test]
    fn test_reset_keeps_session_count() {
        let mut timer = PomodoroTimer::new(1, 5);
        timer.start();
        (0..60).for_each(|_| {
            timer.tick();
        });
        timer.start();
        timer.tick();

        timer.reset();
        assert!(timer.is_work_session());
        assert!(!timer.is_running());
        assert_eq!(timer.time_left(), 60);
        assert_eq!(timer.sessions_completed(), 1);
    }

    #[test]
    fn test_duration_change_applies_only_when_paused_in_matching_phase() {
        let mut timer = PomodoroTimer::new(25, 5);

        timer.set_work_duration(50);
        assert_eq!(timer.time_left(), 3000);

        // other phase: no effect on the countdown
        timer.set_break_duration(10);
        assert_eq!(timer.time_left(), 3000);

        timer.start();
        timer.tick();
        timer.set_work_duration(30);
        assert_eq!(timer.time_left(), 2999);
        assert_eq!(timer.work_minutes(), 30);
    }

    #[test]
    fn test_break_duration_change_during_break_phase() {
        let mut timer = PomodoroTimer::new(1, 5);
        timer.start();
        (0..60).for_each(|_| {
            timer.tick();
        });
        assert!(!timer.is_work_session());
        assert_eq!(timer.time_left(), 300);

        // paused in the break: the countdown follows the new length
        timer.set_break_duration(10);
        assert_eq!(timer.time_left(), 600);

        timer.start();
        timer.tick();
        timer.set_break_duration(3);
        assert_eq!(timer.time_left(), 599);
        assert_eq!(timer.break_minutes(), 3);

        // the new length applies from the next break
        timer.reset();
        timer.start();
        (0..60).for_each(|_| {
            timer.tick();
        });
        assert_eq!(timer.time_left(), 180);
    }

    #[test]
    fn test_progress_and_view() {
        let mut timer = PomodoroTimer::new(1, 1);
        timer.start();
        (0..15).for_each(|_| {
            timer.tick();
        });

        assert!((timer.progress() - 0.25).abs() < f64::EPSILON);
        let view = timer.view();
        assert_eq!(view.display, "00:45");
        assert_eq!(view.phase, "Work Session");
        assert!(view.running);
    }

    #[test]
    fn test_zero_length_phase() {
        let mut timer = PomodoroTimer::new(0, 5);
        assert_eq!(timer.progress(), 0.0);
        timer.start();
        let done = timer.tick();
        assert_eq!(done.map(|d| d.finished), Some(Phase::Work));
    }
}
