//! Raw-mode terminal helpers for the interactive commands.
//!
//! The loops stay on one status line: each redraw returns the cursor to
//! column 0 and clears the line before printing.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use crossterm::cursor::{self, MoveToColumn, RestorePosition, SavePosition};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode};
use crossterm::{execute, queue};

/// Keeps the terminal in raw mode and restores it when dropped, even on panic
pub struct RawModeGuard {
    raw_mode_enabled: bool,
}

impl RawModeGuard {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self {
            raw_mode_enabled: true,
        })
    }

    /// Enter raw mode with the cursor hidden, for loops that only redraw a status line
    pub fn hidden_cursor() -> io::Result<Self> {
        let guard = Self::new()?;
        execute!(io::stdout(), cursor::Hide)?;
        Ok(guard)
    }

    /// Leave raw mode now; dropping the guard afterwards does nothing
    pub fn restore(&mut self) -> io::Result<()> {
        if self.raw_mode_enabled {
            execute!(io::stdout(), cursor::Show)?;
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = execute!(io::stdout(), cursor::Show);
            let _ = disable_raw_mode();
        }
    }
}

/// Fixed-rate tick deadlines.
///
/// Deadlines advance by whole periods, so key presses between ticks do not
/// stretch the interval.
#[derive(Debug, Clone)]
pub struct TickSchedule {
    period: Duration,
    next: Instant,
}

impl TickSchedule {
    pub fn starting_at(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start + period,
        }
    }

    /// How long to wait for input before the next tick is due
    pub fn timeout(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }

    /// Number of ticks due at `now`; the schedule moves past all of them
    pub fn take_due(&mut self, now: Instant) -> u32 {
        let mut due = 0;
        while self.next <= now {
            self.next += self.period;
            due += 1;
        }
        due
    }
}

/// Wait up to `timeout` for a key press. Releases, repeats and non-key events are skipped.
pub fn next_key(timeout: Duration) -> io::Result<Option<KeyEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        _ => Ok(None),
    }
}

/// Block until a key is pressed
pub fn wait_for_key() -> io::Result<KeyEvent> {
    loop {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => return Ok(key),
            _ => {}
        }
    }
}

/// Ctrl-C and Ctrl-D; raw mode delivers them as keys instead of signals
pub fn is_interrupt(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('d'))
}

/// Replace the current line with `text`
pub fn redraw(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    queue!(out, MoveToColumn(0), Clear(ClearType::CurrentLine), Print(text))?;
    out.flush()
}

/// Replace the current line with `text` and move to a fresh line
pub fn print_line(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    queue!(
        out,
        MoveToColumn(0),
        Clear(ClearType::CurrentLine),
        Print(text),
        Print("\r\n")
    )?;
    out.flush()
}

/// Show `text` after the cursor without moving it; the next redraw clears it
pub fn annotate(text: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    queue!(out, SavePosition, Print(text), RestorePosition)?;
    out.flush()
}
