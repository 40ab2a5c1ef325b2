// crates/dualscope-core/src/player.rs
//
// Player seam between the sync viewer and whatever actually plays media.
//
// `PlaybackClock` is the production implementation: a position/duration/paused
// triple advanced by the UI frame delta. The decode pipeline in dualscope-media
// follows the clock, never the other way round. video_module.rs watches each
// clock's play state and `seek_generation` and drives the decoder from them.

use serde::{Deserialize, Serialize};

/// A position jump larger than this is treated as a seek and bumps
/// `seek_generation`, so a playing deck re-opens its decoder at the new spot.
/// Smaller corrections (the secondary being snapped to the primary every tick)
/// only adjust the clock.
pub const RESYNC_TOLERANCE: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckId {
    Primary,
    Secondary,
}

impl DeckId {
    pub const ALL: [DeckId; 2] = [DeckId::Primary, DeckId::Secondary];

    pub fn index(self) -> usize {
        match self {
            DeckId::Primary   => 0,
            DeckId::Secondary => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DeckId::Primary   => "primary",
            DeckId::Secondary => "secondary",
        }
    }
}

/// What the viewer needs from a video player.
pub trait Player {
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, t: f64);
    /// `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;
    fn is_paused(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    /// Metadata arrived from the media pipeline.
    fn load_metadata(&mut self, duration: f64);
    /// Move the position forward by `dt` seconds of wall-clock playback.
    /// Returns true when the position changed.
    fn advance(&mut self, dt: f64) -> bool;
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackClock {
    current_time:    f64,
    duration:        Option<f64>,
    paused:          bool,
    seek_generation: u64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            current_time:    0.0,
            duration:        None,
            paused:          true,
            seek_generation: 0,
        }
    }
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incremented on every position jump larger than `RESYNC_TOLERANCE`.
    pub fn seek_generation(&self) -> u64 {
        self.seek_generation
    }

    pub fn has_ended(&self) -> bool {
        self.duration.is_some_and(|d| self.current_time >= d)
    }

    fn bounded(&self, t: f64) -> f64 {
        let t = t.max(0.0);
        match self.duration {
            Some(d) => t.min(d),
            None    => t,
        }
    }
}

impl Player for PlaybackClock {
    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, t: f64) {
        if t.is_nan() {
            return;
        }
        let t = self.bounded(t);
        if (t - self.current_time).abs() > RESYNC_TOLERANCE {
            self.seek_generation += 1;
        }
        self.current_time = t;
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) {
        // Playing an ended clip starts over.
        if self.has_ended() {
            self.set_current_time(0.0);
        }
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn load_metadata(&mut self, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.duration     = Some(duration);
            self.current_time = self.bounded(self.current_time);
        }
    }

    fn advance(&mut self, dt: f64) -> bool {
        if self.paused || !dt.is_finite() || dt <= 0.0 {
            return false;
        }
        let Some(d) = self.duration else { return false };
        let before = self.current_time;
        self.current_time = (self.current_time + dt).min(d);
        if self.current_time >= d {
            self.paused = true;
        }
        self.current_time != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(duration: f64) -> PlaybackClock {
        let mut c = PlaybackClock::new();
        c.load_metadata(duration);
        c
    }

    #[test]
    fn starts_paused_at_zero_without_duration() {
        let c = PlaybackClock::new();
        assert!(c.is_paused());
        assert_eq!(c.current_time(), 0.0);
        assert_eq!(c.duration(), None);
    }

    #[test]
    fn does_not_advance_before_metadata() {
        let mut c = PlaybackClock::new();
        c.play();
        assert!(!c.advance(0.5));
        assert_eq!(c.current_time(), 0.0);
    }

    #[test]
    fn advance_stops_and_pauses_at_end() {
        let mut c = loaded(1.0);
        c.play();
        assert!(c.advance(0.75));
        assert!(!c.is_paused());
        assert!(c.advance(0.75));
        assert_eq!(c.current_time(), 1.0);
        assert!(c.is_paused());
        assert!(c.has_ended());
    }

    #[test]
    fn play_after_end_restarts() {
        let mut c = loaded(2.0);
        c.set_current_time(2.0);
        c.play();
        assert_eq!(c.current_time(), 0.0);
        assert!(!c.is_paused());
    }

    #[test]
    fn set_current_time_is_bounded_by_media() {
        let mut c = loaded(10.0);
        c.set_current_time(-3.0);
        assert_eq!(c.current_time(), 0.0);
        c.set_current_time(12.0);
        assert_eq!(c.current_time(), 10.0);
        c.set_current_time(f64::NAN);
        assert_eq!(c.current_time(), 10.0);
    }

    #[test]
    fn only_large_jumps_bump_seek_generation() {
        let mut c = loaded(10.0);
        c.set_current_time(0.1);
        assert_eq!(c.seek_generation(), 0);
        c.set_current_time(5.0);
        assert_eq!(c.seek_generation(), 1);
        c.set_current_time(5.2);
        assert_eq!(c.seek_generation(), 1);
    }

    #[test]
    fn invalid_metadata_is_ignored() {
        let mut c = PlaybackClock::new();
        c.load_metadata(0.0);
        c.load_metadata(f64::INFINITY);
        assert_eq!(c.duration(), None);
    }
}
