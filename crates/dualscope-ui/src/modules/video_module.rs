// crates/dualscope-ui/src/modules/video_module.rs
//
// VideoModule owns all per-deck frame logic.
// Non-rendering module: tick() and poll_playback() are called every frame
// from app.rs. No egui panel is shown.
//
// The decode pipeline follows the clocks. Each frame tick() compares every
// deck's clock with what it saw last frame:
//   play edge or seek_generation change  → (re)start the playback pipeline
//   stop edge                            → stop it
//   paused and moved by more than 10 ms  → request a still at the new time
// poll_playback() then promotes decoded frames once the clock reaches them.

use eframe::egui;

use dualscope_core::media_types::PlaybackFrame;
use dualscope_core::player::{DeckId, PlaybackClock, Player};
use dualscope_core::viewer::SyncViewer;

use crate::context::AppContext;

/// A playback frame older than this (relative to the clock) is dropped.
/// Must cover the worst-case burn_to_pts time after a restart.
const STALE_AFTER: f64 = 3.0;
/// Frames behind the clock by more than this are skipped over.
const CATCH_UP: f64 = 1.0 / 30.0;
/// A frame may be shown this far ahead of its PTS.
const EARLY: f64 = 1.0 / 60.0;
/// Smallest paused move that warrants a new still.
const STILL_EPSILON: f64 = 0.010;

pub struct VideoModule;

impl VideoModule {
    // ── poll_playback ─────────────────────────────────────────────────────────
    /// PTS-gated playback frame consumption. Call from app::poll_media().
    ///
    /// Each deck's decode thread pre-fills its channel as fast as FFmpeg can
    /// go. Draining all frames and showing the last would race ahead of the
    /// clock, so a one-slot pending buffer only promotes a frame once the
    /// deck's clock has caught up to its PTS.
    pub fn poll_playback(viewer: &SyncViewer, ctx: &mut AppContext, egui_ctx: &egui::Context) {
        for deck in DeckId::ALL {
            Self::poll_deck(deck, viewer.deck(deck), ctx, egui_ctx);
        }
    }

    fn poll_deck(deck: DeckId, clock: &PlaybackClock, ctx: &mut AppContext, egui_ctx: &egui::Context) {
        if clock.is_paused() {
            return;
        }
        let t      = clock.current_time();
        let worker = &ctx.media_worker;
        let dc     = &mut ctx.decks[deck.index()];

        if dc.pending_pb_frame.as_ref().is_some_and(|f| is_stale(f.timestamp, t)) {
            dc.pending_pb_frame = None;
        }

        // Step 1: fill pending slot if empty.
        if dc.pending_pb_frame.is_none() {
            dc.pending_pb_frame = worker.next_playback_frame(deck);
        }

        // Step 2: fast-forward past overdue frames.
        while dc.pending_pb_frame
            .as_ref()
            .is_some_and(|f: &PlaybackFrame| f.timestamp < t - CATCH_UP)
        {
            match worker.next_playback_frame(deck) {
                Some(newer) => dc.pending_pb_frame = Some(newer),
                None        => break,
            }
        }

        // Step 3: promote pending frame when its PTS is due.
        let due = dc.pending_pb_frame.as_ref().is_some_and(|f| is_due(f.timestamp, t));
        if !due {
            return;
        }
        if let Some(f) = dc.pending_pb_frame.take() {
            let tex = egui_ctx.load_texture(
                format!("pb-{}", deck.label()),
                egui::ColorImage::from_rgba_unmultiplied(
                    [f.width as usize, f.height as usize], &f.data,
                ),
                egui::TextureOptions::LINEAR,
            );
            dc.frame = Some(tex);
            egui_ctx.request_repaint();
            // Pre-pull next frame so it's ready for the next tick.
            dc.pending_pb_frame = worker.next_playback_frame(deck);
        }
    }

    // ── tick ──────────────────────────────────────────────────────────────────
    /// Playback start/stop and paused stills. Call every frame from app::update().
    pub fn tick(viewer: &SyncViewer, ctx: &mut AppContext) {
        for deck in DeckId::ALL {
            Self::tick_deck(deck, viewer.deck(deck), ctx);
        }
    }

    fn tick_deck(deck: DeckId, clock: &PlaybackClock, ctx: &mut AppContext) {
        let playing = !clock.is_paused();
        let t       = clock.current_time();
        let gen     = clock.seek_generation();
        let dc      = &mut ctx.decks[deck.index()];

        let just_started = playing && !dc.prev_playing;
        let just_stopped = !playing && dc.prev_playing;
        dc.prev_playing  = playing;

        // ── Playback mode ─────────────────────────────────────────────────────
        if playing {
            if just_started || gen != dc.seek_generation {
                dc.seek_generation  = gen;
                dc.pending_pb_frame = None;
                dc.last_still_req   = None;
                ctx.media_worker.start_playback(deck, t);
            }
            return;
        }

        // ── Transition: playing → stopped ─────────────────────────────────────
        if just_stopped {
            ctx.media_worker.stop_playback(deck);
            dc.pending_pb_frame = None;
            dc.seek_generation  = gen;
        }

        // ── Paused: exact still at every move ─────────────────────────────────
        // The latest-wins slot in the worker is the rate limiter.
        if still_needed(dc.last_still_req, t) {
            dc.last_still_req = Some(t);
            ctx.media_worker.request_frame(deck, t);
        }
    }
}

fn is_stale(frame_ts: f64, t: f64) -> bool {
    frame_ts < t - STALE_AFTER
}

fn is_due(frame_ts: f64, t: f64) -> bool {
    frame_ts <= t + EARLY && !is_stale(frame_ts, t)
}

fn still_needed(last_req: Option<f64>, t: f64) -> bool {
    last_req.map_or(true, |last| (last - t).abs() > STILL_EPSILON)
}
