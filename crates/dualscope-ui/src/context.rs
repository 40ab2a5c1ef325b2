// crates/dualscope-ui/src/context.rs
//
// AppContext owns all runtime handles that are NOT part of the SyncViewer.
// DualScopeApp holds one of these plus the viewer and the module list.
//
// Sub-struct layout:
//   AppContext
//     ├── media_worker        the FFmpeg worker + all channel handles
//     ├── staged              temp-file copies of both videos (deleted on drop)
//     └── decks[2]: DeckContext   per-deck texture + decode tracking

use eframe::egui;
use tracing::warn;

use dualscope_core::media_types::PlaybackFrame;
use dualscope_core::player::{DeckId, Player};
use dualscope_core::viewer::{SyncViewer, ViewerEvent};
use dualscope_media::{MediaResult, MediaWorker, StagedMedia};

// ── DeckContext ───────────────────────────────────────────────────────────────
// Frame and decode-tracking state for one deck. video_module.rs is the only
// writer of the tracking fields.
#[derive(Default)]
pub struct DeckContext {
    /// Latest frame to draw: a still while paused, a playback frame while playing.
    pub frame: Option<egui::TextureHandle>,

    /// Next-to-display playback frame, held until its PTS is due.
    pub pending_pb_frame: Option<PlaybackFrame>,

    /// Was the deck's clock playing on the previous frame? Used for play/stop edges.
    pub prev_playing: bool,

    /// Clock `seek_generation` seen when playback last (re)started.
    pub seek_generation: u64,

    /// Exact timestamp of the last still-frame request.
    pub last_still_req: Option<f64>,

    pub video_size: Option<(u32, u32)>,

    /// Last media error for this deck, shown in place of the picture.
    pub error: Option<String>,
}

impl DeckContext {
    /// Source aspect ratio, once the probe has reported a size.
    pub fn aspect(&self) -> Option<f32> {
        self.video_size
            .filter(|(w, h)| *w > 0 && *h > 0)
            .map(|(w, h)| w as f32 / h as f32)
    }
}

// ── AppContext ────────────────────────────────────────────────────────────────

pub struct AppContext {
    pub media_worker: MediaWorker,
    /// Kept alive for the worker's file handles; never read after startup.
    _staged:          [StagedMedia; 2],
    pub decks:        [DeckContext; 2],
}

impl AppContext {
    pub fn new(media_worker: MediaWorker, staged: [StagedMedia; 2]) -> Self {
        Self {
            media_worker,
            _staged: staged,
            decks:   Default::default(),
        }
    }

    pub fn deck(&self, deck: DeckId) -> &DeckContext {
        &self.decks[deck.index()]
    }

    pub fn deck_mut(&mut self, deck: DeckId) -> &mut DeckContext {
        &mut self.decks[deck.index()]
    }

    /// Drain the MediaWorker result channels. Called once per frame from
    /// `app::poll_media`, after PTS-gated playback frame consumption.
    ///
    /// This is the single translation layer between raw `MediaWorker` output
    /// and the viewer: a Duration result is the deck's metadata-loaded event.
    pub fn ingest_media_results(&mut self, viewer: &mut SyncViewer, ctx: &egui::Context) {
        // Still frames first so a seek while paused shows up with minimal delay.
        while let Ok(result) = self.media_worker.still_rx.try_recv() {
            self.ingest(result, viewer, ctx);
        }
        while let Ok(result) = self.media_worker.rx.try_recv() {
            self.ingest(result, viewer, ctx);
        }
    }

    fn ingest(&mut self, result: MediaResult, viewer: &mut SyncViewer, ctx: &egui::Context) {
        match result {
            MediaResult::Duration { deck, seconds } => {
                viewer.dispatch(ViewerEvent::MetadataLoaded { deck, duration: seconds });
                ctx.request_repaint();
            }

            MediaResult::VideoSize { deck, width, height } => {
                self.deck_mut(deck).video_size = Some((width, height));
            }

            MediaResult::VideoFrame { deck, width, height, data } => {
                // While playing the pb channel owns `frame`; a late still would
                // overwrite the correct playback frame with a wrong-position one.
                if !viewer.deck(deck).is_paused() {
                    return;
                }
                let tex = ctx.load_texture(
                    format!("still-{}", deck.label()),
                    egui::ColorImage::from_rgba_unmultiplied(
                        [width as usize, height as usize], &data,
                    ),
                    egui::TextureOptions::LINEAR,
                );
                self.deck_mut(deck).frame = Some(tex);
                ctx.request_repaint();
            }

            MediaResult::Error { deck, msg } => {
                warn!("[media] {}: {msg}", deck.label());
                self.deck_mut(deck).error = Some(msg);
                ctx.request_repaint();
            }
        }
    }
}
