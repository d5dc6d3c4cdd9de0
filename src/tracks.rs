use thiserror::Error;
use tracing::debug;

use crate::audio::AudioOutput;

pub const DEFAULT_VOLUME: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub name: &'static str,
    /// Display length, "M:SS"
    pub duration: &'static str,
}

pub static TRACKS: [Track; 4] = [
    Track {
        name: "Forest Sounds",
        duration: "10:00",
    },
    Track {
        name: "Rain & Thunder",
        duration: "8:30",
    },
    Track {
        name: "Lo-fi Study Beats",
        duration: "12:15",
    },
    Track {
        name: "Ocean Waves",
        duration: "15:00",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackError {
    #[error("Please select a track first")]
    NoTrackSelected,
}

/// Logical player state over the fixed playlist. Sound itself is the audio output's job.
#[derive(Debug)]
pub struct TrackSelector {
    current: Option<usize>,
    state: PlaybackState,
    volume: u8,
}

impl Default for TrackSelector {
    fn default() -> Self {
        Self {
            current: None,
            state: PlaybackState::Stopped,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl TrackSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracks(&self) -> &'static [Track] {
        &TRACKS
    }

    pub fn current(&self) -> Option<&'static Track> {
        self.current.and_then(|index| TRACKS.get(index))
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Choose a track. Switching while playing starts the new track right away.
    pub fn select(&mut self, index: usize, audio: &mut dyn AudioOutput) {
        if index >= TRACKS.len() {
            debug!(index, "track index out of range, ignored");
            return;
        }
        self.current = Some(index);
        if self.state == PlaybackState::Playing {
            audio.play_track(index);
        }
    }

    pub fn toggle_playback(
        &mut self,
        audio: &mut dyn AudioOutput,
    ) -> Result<PlaybackState, TrackError> {
        let index = self.current.ok_or(TrackError::NoTrackSelected)?;
        self.state = match self.state {
            PlaybackState::Playing => {
                audio.pause();
                PlaybackState::Paused
            }
            PlaybackState::Paused | PlaybackState::Stopped => {
                audio.play_track(index);
                PlaybackState::Playing
            }
        };
        Ok(self.state)
    }

    pub fn stop(&mut self, audio: &mut dyn AudioOutput) {
        if self.state == PlaybackState::Stopped {
            return;
        }
        audio.stop();
        self.state = PlaybackState::Stopped;
    }

    /// Set the volume, clamped to 0..=100
    pub fn set_volume(&mut self, volume: i32, audio: &mut dyn AudioOutput) -> u8 {
        // clamp keeps the value inside u8 range
        self.volume = volume.clamp(0, 100) as u8;
        audio.set_volume(self.volume);
        self.volume
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{AudioCall, RecordingAudio};

    #[test]
    fn test_toggle_requires_selection() {
        let mut audio = RecordingAudio::default();
        let mut player = TrackSelector::new();
        assert_eq!(
            player.toggle_playback(&mut audio),
            Err(TrackError::NoTrackSelected)
        );
        assert_eq!(player.state(), PlaybackState::Stopped);
        assert!(audio.calls.borrow().is_empty());
    }

    #[test]
    fn test_play_pause_stop_cycle() {
        let mut audio = RecordingAudio::default();
        let mut player = TrackSelector::new();
        player.select(2, &mut audio);
        assert_eq!(player.current().map(|t| t.name), Some("Lo-fi Study Beats"));

        assert_eq!(player.toggle_playback(&mut audio), Ok(PlaybackState::Playing));
        assert_eq!(player.toggle_playback(&mut audio), Ok(PlaybackState::Paused));
        player.stop(&mut audio);
        player.stop(&mut audio);

        assert_eq!(player.state(), PlaybackState::Stopped);
        assert_eq!(
            *audio.calls.borrow(),
            vec![AudioCall::Track(2), AudioCall::Pause, AudioCall::Stop]
        );
    }

    #[test]
    fn test_switching_while_playing_restarts_audio() {
        let mut audio = RecordingAudio::default();
        let mut player = TrackSelector::new();
        player.select(0, &mut audio);
        player.toggle_playback(&mut audio).unwrap();
        player.select(3, &mut audio);
        player.select(9, &mut audio);

        assert_eq!(player.current_index(), Some(3));
        assert_eq!(
            *audio.calls.borrow(),
            vec![AudioCall::Track(0), AudioCall::Track(3)]
        );
    }

    #[test]
    fn test_volume_is_clamped() {
        let mut audio = RecordingAudio::default();
        let mut player = TrackSelector::new();
        assert_eq!(player.volume(), DEFAULT_VOLUME);
        assert_eq!(player.set_volume(150, &mut audio), 100);
        assert_eq!(player.set_volume(-4, &mut audio), 0);
        assert_eq!(player.set_volume(35, &mut audio), 35);
        assert_eq!(
            *audio.calls.borrow(),
            vec![AudioCall::Volume(100), AudioCall::Volume(0), AudioCall::Volume(35)]
        );
    }
}
