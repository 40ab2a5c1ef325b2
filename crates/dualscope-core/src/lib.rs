// crates/dualscope-core/src/lib.rs
//
// Pure viewer logic: no egui, no ffmpeg, no runtime handles.
// Shared by dualscope-media (channel types) and dualscope-ui (everything else).

pub mod commands;
pub mod config;
pub mod helpers;
pub mod media_types;
pub mod player;
pub mod trace;
pub mod viewer;

pub use player::{DeckId, PlaybackClock, Player};
pub use trace::ValueTrace;
pub use viewer::{Readout, SyncViewer, ViewerError, ViewerEvent, ViewerPhase};
