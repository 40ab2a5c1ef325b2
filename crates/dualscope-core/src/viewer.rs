// crates/dualscope-core/src/viewer.rs
//
// SyncViewer: two players, one scrub control, one probability readout.
//
// The primary player is the only timing authority. Every change to its
// position (playback tick, skip, seek) is pushed to the secondary, the scrub
// control and the readout in `propagate()`. The only thing that flows the
// other way is play/pause: playing or pausing the secondary directly mirrors
// onto the primary, and only when the primary is not already in that state.
//
// Inbound notifications go through an explicit subscription table built in
// `new()` and cleared in `dispose()`. Once disposed, `dispatch` drops events.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::player::{DeckId, PlaybackClock, Player};
use crate::trace::ValueTrace;

/// Scrub bar resolution in seconds.
pub const SCRUB_STEP: f64 = 0.05;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewerError {
    #[error("primary video metadata has not loaded yet")]
    NotReady,
}

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewerPhase {
    Unloaded,
    MetadataPending,
    Ready,
}

// ── Scrub control ─────────────────────────────────────────────────────────────

/// Range control mirroring the primary's position. `max` is 0 until ready.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrubControl {
    pub value: f64,
    pub max:   f64,
    pub step:  f64,
}

impl Default for ScrubControl {
    fn default() -> Self {
        Self { value: 0.0, max: 0.0, step: SCRUB_STEP }
    }
}

// ── Readout ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Readout {
    /// Shown as `--` until the primary's duration is known.
    #[default]
    Pending,
    Percent(i32),
}

impl Readout {
    pub fn percent(self) -> Option<i32> {
        match self {
            Readout::Pending    => None,
            Readout::Percent(v) => Some(v),
        }
    }
}

impl fmt::Display for Readout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Readout::Pending    => f.write_str("--"),
            Readout::Percent(v) => write!(f, "{v}"),
        }
    }
}

// ── Events and subscriptions ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewerEvent {
    /// A deck's media reported its duration.
    MetadataLoaded { deck: DeckId, duration: f64 },
    /// The primary's position advanced through playback.
    TimeUpdate,
    /// The primary's position was set by something outside the viewer.
    Seeked,
    /// The secondary started playing on its own control.
    SecondaryPlay,
    /// The secondary paused on its own control.
    SecondaryPause,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    MetadataLoaded,
    TimeUpdate,
    Seeked,
    SecondaryPlay,
    SecondaryPause,
}

impl ViewerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            ViewerEvent::MetadataLoaded { .. } => EventKind::MetadataLoaded,
            ViewerEvent::TimeUpdate            => EventKind::TimeUpdate,
            ViewerEvent::Seeked                => EventKind::Seeked,
            ViewerEvent::SecondaryPlay         => EventKind::SecondaryPlay,
            ViewerEvent::SecondaryPause        => EventKind::SecondaryPause,
        }
    }
}

pub type Handler<P> = fn(&mut SyncViewer<P>, &ViewerEvent);

/// Event kind → handler. One handler per kind.
pub struct Subscriptions<P: Player> {
    table: HashMap<EventKind, Handler<P>>,
}

impl<P: Player> Subscriptions<P> {
    fn standard() -> Self {
        let mut table: HashMap<EventKind, Handler<P>> = HashMap::new();
        table.insert(EventKind::MetadataLoaded, SyncViewer::<P>::on_metadata_loaded);
        table.insert(EventKind::TimeUpdate,     SyncViewer::<P>::on_position_changed);
        table.insert(EventKind::Seeked,         SyncViewer::<P>::on_position_changed);
        table.insert(EventKind::SecondaryPlay,  SyncViewer::<P>::on_secondary_play);
        table.insert(EventKind::SecondaryPause, SyncViewer::<P>::on_secondary_pause);
        Self { table }
    }

    pub fn handler(&self, kind: EventKind) -> Option<Handler<P>> {
        self.table.get(&kind).copied()
    }

    pub fn is_subscribed(&self, kind: EventKind) -> bool {
        self.table.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn clear(&mut self) {
        self.table.clear();
    }
}

// ── SyncViewer ────────────────────────────────────────────────────────────────

pub struct SyncViewer<P: Player = PlaybackClock> {
    trace:         ValueTrace,
    primary:       P,
    secondary:     P,
    scrub:         ScrubControl,
    readout:       Readout,
    phase:         ViewerPhase,
    subscriptions: Subscriptions<P>,
}

impl<P: Player> SyncViewer<P> {
    pub fn new(trace: ValueTrace, primary: P, secondary: P) -> Self {
        Self {
            trace,
            primary,
            secondary,
            scrub:         ScrubControl::default(),
            readout:       Readout::Pending,
            phase:         ViewerPhase::Unloaded,
            subscriptions: Subscriptions::standard(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn trace(&self)         -> &ValueTrace       { &self.trace }
    pub fn primary(&self)       -> &P                { &self.primary }
    pub fn secondary(&self)     -> &P                { &self.secondary }
    pub fn scrub(&self)         -> ScrubControl      { self.scrub }
    pub fn readout(&self)       -> Readout           { self.readout }
    pub fn phase(&self)         -> ViewerPhase       { self.phase }
    pub fn subscriptions(&self) -> &Subscriptions<P> { &self.subscriptions }

    pub fn deck(&self, deck: DeckId) -> &P {
        match deck {
            DeckId::Primary   => &self.primary,
            DeckId::Secondary => &self.secondary,
        }
    }

    /// The readiness flag: true once the primary's duration is known.
    pub fn is_ready(&self) -> bool {
        self.phase == ViewerPhase::Ready
    }

    /// Sample index currently shown, or None before ready.
    pub fn current_index(&self) -> Option<usize> {
        let d = self.ready_duration()?;
        Some(self.trace.index_at(self.primary.current_time(), d))
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Media has been assigned to both players; waiting on metadata.
    pub fn attach_sources(&mut self) {
        if self.phase == ViewerPhase::Unloaded {
            self.phase = ViewerPhase::MetadataPending;
            debug!("[viewer] sources attached, waiting for metadata");
        }
    }

    /// Tear down the subscription table. Later events are dropped.
    pub fn dispose(&mut self) {
        self.subscriptions.clear();
        debug!("[viewer] disposed");
    }

    /// Route an inbound notification through the subscription table.
    pub fn dispatch(&mut self, event: ViewerEvent) {
        if let Some(handler) = self.subscriptions.handler(event.kind()) {
            handler(self, &event);
        }
    }

    // ── Transport ─────────────────────────────────────────────────────────────

    /// Play both if the primary is paused, otherwise pause both.
    pub fn toggle_play(&mut self) {
        if self.primary.is_paused() {
            self.primary.play();
            self.secondary.play();
            self.dispatch(ViewerEvent::SecondaryPlay);
        } else {
            self.primary.pause();
            self.secondary.pause();
            self.dispatch(ViewerEvent::SecondaryPause);
        }
        // play() on an ended primary rewinds it.
        self.propagate();
    }

    /// Move the primary by `delta` seconds, saturating at 0 and the duration.
    /// Returns the new position.
    pub fn skip(&mut self, delta: f64) -> Result<f64, ViewerError> {
        let d = self.ready_duration().ok_or(ViewerError::NotReady)?;
        let new_time = (self.primary.current_time() + delta).max(0.0).min(d);
        self.primary.set_current_time(new_time);
        self.propagate();
        Ok(self.primary.current_time())
    }

    /// Jump the primary to `target`. No clamping here; the scrub control's
    /// range bounds what callers pass in.
    pub fn seek(&mut self, target: f64) -> Result<f64, ViewerError> {
        if !self.is_ready() {
            return Err(ViewerError::NotReady);
        }
        self.primary.set_current_time(target);
        self.propagate();
        Ok(self.primary.current_time())
    }

    /// The secondary's own play control.
    pub fn play_secondary(&mut self) {
        self.secondary.play();
        self.dispatch(ViewerEvent::SecondaryPlay);
    }

    /// The secondary's own pause control.
    pub fn pause_secondary(&mut self) {
        self.secondary.pause();
        self.dispatch(ViewerEvent::SecondaryPause);
    }

    pub fn toggle_secondary(&mut self) {
        if self.secondary.is_paused() {
            self.play_secondary();
        } else {
            self.pause_secondary();
        }
    }

    /// Advance both players by one frame of wall-clock time and raise a
    /// time update when the primary moved.
    pub fn tick(&mut self, dt: f64) {
        self.secondary.advance(dt);
        if self.primary.advance(dt) {
            self.dispatch(ViewerEvent::TimeUpdate);
        }
    }

    // ── Handlers ──────────────────────────────────────────────────────────────

    fn on_metadata_loaded(&mut self, event: &ViewerEvent) {
        let ViewerEvent::MetadataLoaded { deck, duration } = *event else { return };
        match deck {
            DeckId::Secondary => self.secondary.load_metadata(duration),
            DeckId::Primary => {
                if self.phase == ViewerPhase::Ready {
                    return;
                }
                self.primary.load_metadata(duration);
                let Some(d) = self.primary.duration() else { return };
                self.scrub.max = d;
                self.phase     = ViewerPhase::Ready;
                debug!("[viewer] ready, primary duration {d:.3}s");
                self.update_readout(0.0);
            }
        }
    }

    fn on_position_changed(&mut self, _event: &ViewerEvent) {
        self.propagate();
    }

    fn on_secondary_play(&mut self, _event: &ViewerEvent) {
        if self.primary.is_paused() {
            self.primary.play();
        }
    }

    fn on_secondary_pause(&mut self, _event: &ViewerEvent) {
        if !self.primary.is_paused() {
            self.primary.pause();
        }
    }

    // ── Propagation ───────────────────────────────────────────────────────────

    fn propagate(&mut self) {
        let t = self.primary.current_time();
        self.secondary.set_current_time(t);
        self.scrub.value = t;
        self.update_readout(t);
    }

    fn update_readout(&mut self, t: f64) {
        let Some(d) = self.ready_duration() else { return };
        self.readout = Readout::Percent(self.trace.value_at(t, d));
    }

    fn ready_duration(&self) -> Option<f64> {
        if !self.is_ready() {
            return None;
        }
        self.primary.duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// PlaybackClock that records how often play/pause were called.
    #[derive(Default)]
    struct CountingPlayer {
        clock:  PlaybackClock,
        plays:  usize,
        pauses: usize,
    }

    impl Player for CountingPlayer {
        fn current_time(&self) -> f64            { self.clock.current_time() }
        fn set_current_time(&mut self, t: f64)   { self.clock.set_current_time(t) }
        fn duration(&self) -> Option<f64>        { self.clock.duration() }
        fn is_paused(&self) -> bool              { self.clock.is_paused() }
        fn play(&mut self)                       { self.plays += 1; self.clock.play() }
        fn pause(&mut self)                      { self.pauses += 1; self.clock.pause() }
        fn load_metadata(&mut self, d: f64)      { self.clock.load_metadata(d) }
        fn advance(&mut self, dt: f64) -> bool   { self.clock.advance(dt) }
    }

    fn ramp(len: usize) -> ValueTrace {
        ValueTrace::new((0..len as i32).collect()).unwrap()
    }

    fn ready_viewer(len: usize, duration: f64) -> SyncViewer<CountingPlayer> {
        let mut v = SyncViewer::new(ramp(len), CountingPlayer::default(), CountingPlayer::default());
        v.attach_sources();
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Secondary, duration });
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Primary, duration });
        v
    }

    #[test]
    fn state_machine_walks_to_ready() {
        let mut v: SyncViewer = SyncViewer::new(ramp(10), PlaybackClock::new(), PlaybackClock::new());
        assert_eq!(v.phase(), ViewerPhase::Unloaded);
        v.attach_sources();
        assert_eq!(v.phase(), ViewerPhase::MetadataPending);
        assert_eq!(v.readout(), Readout::Pending);
        assert_eq!(v.scrub().max, 0.0);

        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Primary, duration: 30.0 });
        assert_eq!(v.phase(), ViewerPhase::Ready);
        assert!(v.is_ready());
        assert_eq!(v.scrub().max, 30.0);
        assert_eq!(v.readout(), Readout::Percent(0));
    }

    #[test]
    fn secondary_metadata_does_not_make_viewer_ready() {
        let mut v: SyncViewer = SyncViewer::new(ramp(10), PlaybackClock::new(), PlaybackClock::new());
        v.attach_sources();
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Secondary, duration: 30.0 });
        assert!(!v.is_ready());
        assert_eq!(v.secondary().duration(), Some(30.0));
        assert_eq!(v.readout(), Readout::Pending);
    }

    #[test]
    fn ready_is_terminal() {
        let mut v = ready_viewer(10, 30.0);
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Primary, duration: 99.0 });
        assert_eq!(v.scrub().max, 30.0);
        assert_eq!(v.primary().duration(), Some(30.0));
    }

    #[test]
    fn readout_placeholder_before_ready() {
        assert_eq!(Readout::Pending.to_string(), "--");
        assert_eq!(Readout::Percent(42).to_string(), "42");
    }

    #[test]
    fn skip_and_seek_need_metadata() {
        let mut v = SyncViewer::new(ramp(10), CountingPlayer::default(), CountingPlayer::default());
        assert_eq!(v.skip(5.0), Err(ViewerError::NotReady));
        assert_eq!(v.seek(5.0), Err(ViewerError::NotReady));
        assert_eq!(v.primary().current_time(), 0.0);
        assert_eq!(v.readout(), Readout::Pending);
    }

    #[test]
    fn skip_back_saturates_at_zero() {
        let mut v = ready_viewer(1139, 100.0);
        v.seek(3.0).unwrap();
        assert_eq!(v.skip(-10.0), Ok(0.0));
        assert_eq!(v.secondary().current_time(), 0.0);
        assert_eq!(v.scrub().value, 0.0);
    }

    #[test]
    fn skip_forward_saturates_at_duration() {
        let mut v = ready_viewer(1139, 100.0);
        v.seek(95.0).unwrap();
        assert_eq!(v.skip(10.0), Ok(100.0));
        assert_eq!(v.readout(), Readout::Percent(1138));
    }

    #[test]
    fn skip_there_and_back_restores_position() {
        let mut v = ready_viewer(1139, 100.0);
        v.seek(40.0).unwrap();
        for d in [5.0, 10.0, 0.05, 33.3] {
            let before = v.primary().current_time();
            v.skip(d).unwrap();
            v.skip(-d).unwrap();
            assert!((v.primary().current_time() - before).abs() < 1e-9, "delta {d}");
        }
    }

    #[test]
    fn seek_propagates_to_secondary_and_scrub() {
        let mut v = ready_viewer(1139, 113.9);
        for target in [0.0, 12.35, 56.95, 113.9] {
            v.seek(target).unwrap();
            assert_eq!(v.secondary().current_time(), target);
            assert_eq!(v.scrub().value, target);
        }
    }

    #[test]
    fn readout_follows_primary_position() {
        let mut v = ready_viewer(1139, 113.9);
        v.seek(56.95).unwrap();
        assert_eq!(v.current_index(), Some(569));
        assert_eq!(v.readout(), Readout::Percent(569));
    }

    #[test]
    fn readout_ignores_secondary_duration() {
        let mut v = SyncViewer::new(ramp(101), CountingPlayer::default(), CountingPlayer::default());
        v.attach_sources();
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Secondary, duration: 10.0 });
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Primary, duration: 100.0 });
        v.seek(50.0).unwrap();
        assert_eq!(v.readout(), Readout::Percent(50));
    }

    #[test]
    fn toggle_play_twice_restores_state() {
        let mut v = ready_viewer(10, 30.0);
        assert!(v.primary().is_paused() && v.secondary().is_paused());
        v.toggle_play();
        assert!(!v.primary().is_paused() && !v.secondary().is_paused());
        v.toggle_play();
        assert!(v.primary().is_paused() && v.secondary().is_paused());
    }

    #[test]
    fn toggle_play_does_not_double_drive_primary() {
        let mut v = ready_viewer(10, 30.0);
        v.toggle_play();
        assert_eq!(v.primary().plays, 1);
        v.toggle_play();
        assert_eq!(v.primary().pauses, 1);
    }

    #[test]
    fn secondary_controls_mirror_onto_primary() {
        let mut v = ready_viewer(10, 30.0);
        v.play_secondary();
        assert!(!v.primary().is_paused());
        assert_eq!(v.primary().plays, 1);

        // Already playing: no redundant call.
        v.play_secondary();
        assert_eq!(v.primary().plays, 1);

        v.pause_secondary();
        assert!(v.primary().is_paused());
        assert_eq!(v.primary().pauses, 1);
        v.pause_secondary();
        assert_eq!(v.primary().pauses, 1);
    }

    #[test]
    fn tick_drives_secondary_and_readout() {
        let mut v = ready_viewer(101, 10.0);
        v.toggle_play();
        for _ in 0..50 {
            v.tick(0.1);
        }
        assert!((v.primary().current_time() - 5.0).abs() < 1e-9);
        assert_eq!(v.secondary().current_time(), v.primary().current_time());
        assert_eq!(v.scrub().value, v.primary().current_time());
        assert_eq!(v.current_index(), Some(lookup(v.primary().current_time(), 10.0, 101)));
    }

    fn lookup(t: f64, d: f64, len: usize) -> usize {
        crate::trace::lookup_index(t, d, len)
    }

    #[test]
    fn tick_while_paused_is_silent() {
        let mut v = ready_viewer(10, 10.0);
        v.seek(2.0).unwrap();
        v.tick(1.0);
        assert_eq!(v.primary().current_time(), 2.0);
    }

    #[test]
    fn primary_end_pauses_primary_only() {
        let mut v = ready_viewer(10, 1.0);
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Secondary, duration: 5.0 });
        v.toggle_play();
        v.tick(2.0);
        assert!(v.primary().is_paused());
        assert_eq!(v.primary().current_time(), 1.0);
        assert!(!v.secondary().is_paused());
    }

    #[test]
    fn subscription_table_covers_every_event_kind() {
        let v = ready_viewer(10, 10.0);
        for kind in [
            EventKind::MetadataLoaded,
            EventKind::TimeUpdate,
            EventKind::Seeked,
            EventKind::SecondaryPlay,
            EventKind::SecondaryPause,
        ] {
            assert!(v.subscriptions().is_subscribed(kind), "{kind:?}");
        }
        assert_eq!(v.subscriptions().len(), 5);
    }

    #[test]
    fn disposed_viewer_ignores_events() {
        let mut v: SyncViewer = SyncViewer::new(ramp(10), PlaybackClock::new(), PlaybackClock::new());
        v.attach_sources();
        v.dispose();
        assert!(v.subscriptions().is_empty());
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Primary, duration: 10.0 });
        assert!(!v.is_ready());
        assert_eq!(v.readout(), Readout::Pending);
    }

    #[test]
    fn external_seek_event_refreshes_readout() {
        let mut v: SyncViewer = SyncViewer::new(ramp(11), PlaybackClock::new(), PlaybackClock::new());
        v.attach_sources();
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Primary, duration: 10.0 });
        v.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Secondary, duration: 10.0 });
        // A seek that bypassed the viewer; the Seeked notification catches up.
        let mut moved = v.primary().clone();
        moved.set_current_time(7.0);
        v.primary = moved;
        v.dispatch(ViewerEvent::Seeked);
        assert_eq!(v.readout(), Readout::Percent(7));
        assert_eq!(v.secondary().current_time(), 7.0);
    }
}
