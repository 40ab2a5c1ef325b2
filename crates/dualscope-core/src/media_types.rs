// crates/dualscope-core/src/media_types.rs
//
// Types that flow across the channels between dualscope-media and dualscope-ui.
// No egui, no ffmpeg. Plain data only.

use crate::player::DeckId;

/// Results sent from the MediaWorker background threads to the UI.
pub enum MediaResult {
    /// Metadata is in: the deck's duration is known.
    Duration   { deck: DeckId, seconds: f64 },
    VideoSize  { deck: DeckId, width: u32, height: u32 },
    /// A still frame for a paused deck (poster frame or seek target).
    VideoFrame { deck: DeckId, width: u32, height: u32, data: Vec<u8> },
    Error      { deck: DeckId, msg: String },
}

/// A decoded frame from a deck's playback pipeline.
pub struct PlaybackFrame {
    pub deck:      DeckId,
    /// Which `start_playback` call produced this frame. Frames from an
    /// earlier run can still be in flight after a restart.
    pub run:       u64,
    pub timestamp: f64,
    pub width:     u32,
    pub height:    u32,
    pub data:      Vec<u8>, // RGBA
}
