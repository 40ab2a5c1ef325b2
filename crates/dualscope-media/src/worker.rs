// crates/dualscope-media/src/worker.rs
//
// MediaWorker: owns one still-frame slot and one playback decode thread per
// deck. All public API that dualscope-ui calls lives here.
//
// Each deck has its own lane so the two videos never contend: a seek on the
// secondary cannot delay a frame on the primary.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use dualscope_core::media_types::{MediaResult, PlaybackFrame};
use dualscope_core::player::DeckId;

use crate::decode::LiveDecoder;
use crate::probe::probe_media;

// ── Internal types ────────────────────────────────────────────────────────────

enum StillRequest {
    Frame { path: PathBuf, ts: f64 },
    Shutdown,
}

enum PlaybackCmd {
    Start { path: PathBuf, ts: f64, run: u64 },
    Stop,
    Shutdown,
}

type StillSlot = Arc<(Mutex<Option<StillRequest>>, Condvar)>;

struct DeckLane {
    path:      PathBuf,
    /// Latest-wins slot for paused-deck frames.
    still_req: StillSlot,
    pb_tx:     Sender<PlaybackCmd>,
    pb_rx:     Receiver<PlaybackFrame>,
    /// Id of the latest playback run; bumped by every start.
    run:       AtomicU64,
}

// ── MediaWorker ───────────────────────────────────────────────────────────────

pub struct MediaWorker {
    /// Probe results: Duration, VideoSize, Error.
    pub rx:       Receiver<MediaResult>,
    tx:           Sender<MediaResult>,
    /// Still frames for both decks.
    pub still_rx: Receiver<MediaResult>,
    lanes:        [DeckLane; 2],
    shutdown:     Arc<AtomicBool>,
}

impl MediaWorker {
    /// Spawn the decode threads for a primary and a secondary video.
    pub fn new(primary: PathBuf, secondary: PathBuf) -> Result<Self> {
        let (tx, rx)             = bounded(64);
        let (still_tx, still_rx) = bounded(8);

        let lanes = [
            DeckLane::spawn(DeckId::Primary,   primary,   still_tx.clone())?,
            DeckLane::spawn(DeckId::Secondary, secondary, still_tx)?,
        ];

        Ok(Self {
            rx, tx, still_rx, lanes,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    fn lane(&self, deck: DeckId) -> &DeckLane {
        &self.lanes[deck.index()]
    }

    /// Probe both decks in the background. Results arrive on `rx`.
    pub fn probe_all(&self) {
        for deck in DeckId::ALL {
            self.probe(deck);
        }
    }

    pub fn probe(&self, deck: DeckId) {
        let tx   = self.tx.clone();
        let sd   = self.shutdown.clone();
        let path = self.lane(deck).path.clone();
        thread::spawn(move || {
            if sd.load(Ordering::Relaxed) { return; }
            probe_media(&path, deck, &tx);
        });
    }

    /// Ask for the frame at `timestamp`. Overwrites any pending request so the
    /// decode thread always gets the freshest one.
    pub fn request_frame(&self, deck: DeckId, timestamp: f64) {
        let lane = self.lane(deck);
        let (lock, cvar) = &*lane.still_req;
        *lock.lock() = Some(StillRequest::Frame { path: lane.path.clone(), ts: timestamp });
        cvar.notify_one();
    }

    /// Start the deck's playback pipeline at `ts` seconds.
    pub fn start_playback(&self, deck: DeckId, ts: f64) {
        let lane = self.lane(deck);
        let run  = lane.run.fetch_add(1, Ordering::Relaxed) + 1;
        // Flush stale frames from the previous run. A send that was blocked on
        // the full channel may still land after this; next_playback_frame drops it.
        while lane.pb_rx.try_recv().is_ok() {}
        let _ = lane.pb_tx.try_send(PlaybackCmd::Start { path: lane.path.clone(), ts, run });
    }

    pub fn stop_playback(&self, deck: DeckId) {
        let _ = self.lane(deck).pb_tx.try_send(PlaybackCmd::Stop);
    }

    /// Next decoded frame from the deck's current playback run, in PTS order.
    pub fn next_playback_frame(&self, deck: DeckId) -> Option<PlaybackFrame> {
        let lane = self.lane(deck);
        recv_current(&lane.pb_rx, lane.run.load(Ordering::Relaxed))
    }

    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for lane in &self.lanes {
            // Poison-pill wakes the still thread off its condvar.
            let (lock, cvar) = &*lane.still_req;
            *lock.lock() = Some(StillRequest::Shutdown);
            cvar.notify_one();

            // Unblock a playback thread parked on a full channel, then stop it.
            while lane.pb_rx.try_recv().is_ok() {}
            let _ = lane.pb_tx.try_send(PlaybackCmd::Shutdown);
        }
    }
}

// ── Per-deck threads ──────────────────────────────────────────────────────────

impl DeckLane {
    fn spawn(deck: DeckId, path: PathBuf, still_tx: Sender<MediaResult>) -> Result<Self> {
        let still_req: StillSlot = Arc::new((Mutex::new(None), Condvar::new()));

        let slot = Arc::clone(&still_req);
        thread::Builder::new()
            .name(format!("still-{}", deck.label()))
            .spawn(move || still_loop(deck, slot, still_tx))
            .context("spawning still-frame thread")?;

        // ~1 s lookahead at 25 fps. send() blocking on a full channel is the
        // rate limiter.
        let (pb_tx, pb_cmd_rx)   = bounded::<PlaybackCmd>(4);
        let (pb_frame_tx, pb_rx) = bounded::<PlaybackFrame>(24);
        thread::Builder::new()
            .name(format!("playback-{}", deck.label()))
            .spawn(move || playback_loop(deck, pb_cmd_rx, pb_frame_tx))
            .context("spawning playback thread")?;

        Ok(Self { path, still_req, pb_tx, pb_rx, run: AtomicU64::new(0) })
    }
}

fn still_loop(deck: DeckId, slot: StillSlot, tx: Sender<MediaResult>) {
    let mut live: Option<LiveDecoder> = None;
    loop {
        let req = {
            let (lock, cvar) = &*slot;
            let mut guard = lock.lock();
            loop {
                if let Some(req) = guard.take() {
                    break req;
                }
                cvar.wait(&mut guard);
            }
        };

        let (path, ts) = match req {
            StillRequest::Frame { path, ts } => (path, ts),
            StillRequest::Shutdown           => return,
        };

        // Re-open (seek to keyframe) on a different file, any backward move,
        // or a forward jump over 2 s. advance_to() only goes forward and a
        // long forward decode would stall the slot.
        let needs_reset = live.as_ref().map_or(true, |d| {
            let tpts     = d.ts_to_pts(ts);
            let two_secs = d.ts_to_pts(2.0);
            d.path != path || tpts <= d.last_pts || tpts > d.last_pts + two_secs
        });

        let frame = if needs_reset {
            match LiveDecoder::open(deck, &path, ts) {
                Ok(mut d) => {
                    let tpts = d.ts_to_pts(ts);
                    d.burn_to_pts(tpts);
                    let frame = d.next_frame().map(|(data, w, h, _)| (data, w, h));
                    live = Some(d);
                    frame
                }
                Err(e) => {
                    warn!("[still] {} open: {e}", deck.label());
                    let _ = tx.send(MediaResult::Error { deck, msg: e.to_string() });
                    None
                }
            }
        } else {
            live.as_mut().and_then(|d| {
                let tpts = d.ts_to_pts(ts);
                d.advance_to(tpts)
            })
        };

        if let Some((data, width, height)) = frame {
            debug!("[still] {} frame at {ts:.3}s", deck.label());
            if tx.send(MediaResult::VideoFrame { deck, width, height, data }).is_err() {
                return;
            }
        }
    }
}

/// Pop frames until one from `run` turns up. Older runs are discarded.
fn recv_current(rx: &Receiver<PlaybackFrame>, run: u64) -> Option<PlaybackFrame> {
    loop {
        let f = rx.try_recv().ok()?;
        if f.run == run {
            return Some(f);
        }
    }
}

fn playback_loop(deck: DeckId, cmd_rx: Receiver<PlaybackCmd>, frame_tx: Sender<PlaybackFrame>) {
    let mut decoder: Option<LiveDecoder> = None;
    let mut run = 0;
    loop {
        // Block for a command while idle; poll between frames while decoding.
        let cmd = if decoder.is_some() {
            match cmd_rx.try_recv() {
                Ok(cmd)                         => Some(cmd),
                Err(TryRecvError::Empty)        => None,
                Err(TryRecvError::Disconnected) => return,
            }
        } else {
            match cmd_rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_)  => return,
            }
        };

        match cmd {
            Some(PlaybackCmd::Start { path, ts, run: next }) => {
                run = next;
                // Burn synchronously before the first send so the first frame
                // out is already at the requested position.
                decoder = match LiveDecoder::open(deck, &path, ts) {
                    Ok(mut d) => {
                        let tpts = d.ts_to_pts(ts);
                        let burned = d.burn_to_pts(tpts);
                        debug!("[pb] {} run {run} started at {ts:.3}s after {burned} frames", deck.label());
                        Some(d)
                    }
                    Err(e) => {
                        warn!("[pb] {} open: {e}", deck.label());
                        None
                    }
                };
                continue;
            }
            Some(PlaybackCmd::Stop)     => { decoder = None; continue; }
            Some(PlaybackCmd::Shutdown) => return,
            None                        => {}
        }

        let Some(d) = decoder.as_mut() else { continue };
        match d.next_frame() {
            Some((data, width, height, timestamp)) => {
                let f = PlaybackFrame { deck, run, timestamp, width, height, data };
                if frame_tx.send(f).is_err() { return; }
            }
            None => {
                debug!("[pb] {} reached end of stream", deck.label());
                decoder = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn probing_a_missing_file_reports_an_error() {
        let worker = MediaWorker::new(
            PathBuf::from("/no/such/primary.mp4"),
            PathBuf::from("/no/such/secondary.mp4"),
        ).unwrap();
        worker.probe(DeckId::Secondary);
        match worker.rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            MediaResult::Error { deck, .. } => assert_eq!(deck, DeckId::Secondary),
            _ => panic!("expected an error result"),
        }
        worker.shutdown();
    }

    #[test]
    fn still_request_for_missing_file_reports_an_error() {
        let worker = MediaWorker::new(
            PathBuf::from("/no/such/primary.mp4"),
            PathBuf::from("/no/such/secondary.mp4"),
        ).unwrap();
        worker.request_frame(DeckId::Primary, 1.0);
        match worker.still_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            MediaResult::Error { deck, .. } => assert_eq!(deck, DeckId::Primary),
            _ => panic!("expected an error result"),
        }
        worker.shutdown();
    }

    #[test]
    fn playback_of_missing_file_yields_no_frames() {
        let worker = MediaWorker::new(
            PathBuf::from("/no/such/primary.mp4"),
            PathBuf::from("/no/such/secondary.mp4"),
        ).unwrap();
        worker.start_playback(DeckId::Primary, 0.0);
        std::thread::sleep(Duration::from_millis(200));
        assert!(worker.next_playback_frame(DeckId::Primary).is_none());
        worker.shutdown();
    }

    fn frame(run: u64, timestamp: f64) -> PlaybackFrame {
        PlaybackFrame { deck: DeckId::Primary, run, timestamp, width: 2, height: 2, data: vec![0; 16] }
    }

    #[test]
    fn frames_from_an_earlier_run_are_dropped() {
        // A send blocked before a restart from 50 s back to 10 s lands after the flush.
        let (tx, rx) = bounded(8);
        tx.send(frame(1, 51.0)).unwrap();
        tx.send(frame(1, 51.04)).unwrap();
        tx.send(frame(2, 10.0)).unwrap();
        tx.send(frame(2, 10.04)).unwrap();

        let first = recv_current(&rx, 2).unwrap();
        assert_eq!((first.run, first.timestamp), (2, 10.0));
        assert_eq!(recv_current(&rx, 2).unwrap().timestamp, 10.04);
        assert!(recv_current(&rx, 2).is_none());
    }

    #[test]
    fn only_stale_frames_means_nothing_to_show() {
        let (tx, rx) = bounded(4);
        tx.send(frame(3, 80.0)).unwrap();
        assert!(recv_current(&rx, 4).is_none());
        assert!(rx.is_empty());
    }
}
