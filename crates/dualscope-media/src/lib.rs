// crates/dualscope-media/src/lib.rs
//
// No egui dependency. Communicates with dualscope-ui via channels only.
//
// assets.rs runs once at startup; everything else is the per-deck decode
// pipeline driven through MediaWorker.

pub mod assets;
pub mod decode;
pub mod probe;
pub mod worker;

// Re-export the main public API so dualscope-ui imports are simple.
pub use assets::{load_trace, MediaBlob, StagedMedia, TraceLayout};
pub use worker::MediaWorker;
pub use dualscope_core::media_types::{MediaResult, PlaybackFrame};
