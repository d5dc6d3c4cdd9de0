//! Shared test utilities.
//!
//! Clocks, stores and audio sinks used across the unit test modules.

#![cfg(test)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::{DateTime, Duration, Local, TimeZone};
use serde_json::Value;

use crate::audio::AudioOutput;
use crate::clock::Clock;
use crate::store::{KeyValueStore, MemoryStore, Persistence, StoreError};

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Cell<DateTime<Local>>,
}

impl ManualClock {
    pub fn at(now: DateTime<Local>) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

/// Mid-afternoon local time, far enough from midnight that small offsets stay on the same day
pub fn afternoon() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 14, 15, 0, 0)
        .single()
        .expect("unambiguous local time")
}

/// A store that rejects every call
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    fn set(&self, _key: &str, _value: &Value) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk detached".to_string()))
    }
}

/// A fresh in-memory store plus a persistence handle on it
pub fn memory_persistence(scope: &'static str) -> (Rc<dyn KeyValueStore>, Persistence) {
    let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
    let persistence = Persistence::new(Rc::clone(&store), scope);
    (store, persistence)
}

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCall {
    Tone(u32, u32),
    Track(usize),
    Pause,
    Stop,
    Volume(u8),
}

/// Records every request made to the audio capability
#[derive(Debug, Clone, Default)]
pub struct RecordingAudio {
    pub calls: Rc<RefCell<Vec<AudioCall>>>,
}

impl AudioOutput for RecordingAudio {
    fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32) {
        self.calls
            .borrow_mut()
            .push(AudioCall::Tone(frequency_hz, duration_ms));
    }

    fn play_track(&mut self, track_id: usize) {
        self.calls.borrow_mut().push(AudioCall::Track(track_id));
    }

    fn pause(&mut self) {
        self.calls.borrow_mut().push(AudioCall::Pause);
    }

    fn stop(&mut self) {
        self.calls.borrow_mut().push(AudioCall::Stop);
    }

    fn set_volume(&mut self, volume: u8) {
        self.calls.borrow_mut().push(AudioCall::Volume(volume));
    }
}
