use tracing::info;

/// Sound capability consumed by the dashboard. Implementations own the
/// actual device; the core only issues requests.
pub trait AudioOutput {
    fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32);
    fn play_track(&mut self, track_id: usize);
    fn pause(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: u8);
}

/// Audio output that records requests in the log instead of producing sound
#[derive(Debug, Default)]
pub struct LoggingAudio;

impl AudioOutput for LoggingAudio {
    fn play_tone(&mut self, frequency_hz: u32, duration_ms: u32) {
        info!(frequency_hz, duration_ms, "play tone");
    }

    fn play_track(&mut self, track_id: usize) {
        info!(track_id, "play track");
    }

    fn pause(&mut self) {
        info!("pause track");
    }

    fn stop(&mut self) {
        info!("stop track");
    }

    fn set_volume(&mut self, volume: u8) {
        info!(volume, "set volume");
    }
}
