// src/app.rs (dualscope-ui)
use dualscope_core::commands::ViewerCommand;
use dualscope_core::config::ViewerConfig;
use dualscope_core::player::{PlaybackClock, Player};
use dualscope_core::trace::ValueTrace;
use dualscope_core::viewer::{SyncViewer, ViewerError};
use dualscope_media::{MediaWorker, StagedMedia};
use crate::context::AppContext;
use crate::theme::{configure_style, ACCENT};
use crate::modules::{
    ViewerModule,
    decks::DecksModule,
    readout::ReadoutModule,
    scrub::ScrubModule,
    transport::TransportModule,
    video_module::VideoModule,
};
use eframe::egui;
use tracing::{debug, info};

/// Gap between the video column and the readout.
const COLUMN_GAP: f32 = 24.0;
const IDLE_POLL:  std::time::Duration = std::time::Duration::from_millis(50);

/// Everything loaded before the window opens.
pub struct Session {
    pub config: ViewerConfig,
    pub trace:  ValueTrace,
    pub worker: MediaWorker,
    pub staged: [StagedMedia; 2],
}

// ── App ───────────────────────────────────────────────────────────────────────

pub struct DualScopeApp {
    viewer:       SyncViewer,
    context:      AppContext,
    heading:      String,
    transport:    TransportModule,
    scrub:        ScrubModule,
    decks:        DecksModule,
    readout:      ReadoutModule,
    /// Commands emitted by modules each frame, processed after the UI pass
    pending_cmds: Vec<ViewerCommand>,
}

impl DualScopeApp {
    pub fn new(cc: &eframe::CreationContext<'_>, session: Session) -> Self {
        configure_style(&cc.egui_ctx);
        // Pin to dark mode so OS light/dark changes don't overwrite the theme.
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        let Session { config, trace, worker, staged } = session;

        let mut viewer = SyncViewer::new(trace, PlaybackClock::new(), PlaybackClock::new());
        viewer.attach_sources();
        worker.probe_all();

        let app = Self {
            viewer,
            context:      AppContext::new(worker, staged),
            heading:      config.heading,
            transport:    TransportModule,
            scrub:        ScrubModule,
            decks:        DecksModule::new(config.crop),
            readout:      ReadoutModule::new(config.readout_label),
            pending_cmds: Vec::new(),
        };
        debug!(
            "[app] panels: {}",
            [app.transport.name(), app.scrub.name(), app.decks.name(), app.readout.name()].join(", "),
        );
        app
    }

    fn process_command(&mut self, cmd: ViewerCommand) {
        let result = match cmd {
            ViewerCommand::TogglePlay      => { self.viewer.toggle_play(); Ok(()) }
            ViewerCommand::ToggleSecondary => { self.viewer.toggle_secondary(); Ok(()) }
            ViewerCommand::Skip(delta)     => self.viewer.skip(delta).map(|_| ()),
            ViewerCommand::Seek(t)         => self.viewer.seek(t).map(|_| ()),
        };
        // Transport is greyed out until ready; a keyboard skip can still land here.
        if let Err(ViewerError::NotReady) = result {
            debug!("[app] {cmd:?} ignored: not ready");
        }
    }

    fn poll_media(&mut self, ctx: &egui::Context) {
        // ── Playback frame consumption (PTS-gated) ────────────────────────────
        VideoModule::poll_playback(&self.viewer, &mut self.context, ctx);

        // ── Metadata, stills, errors ──────────────────────────────────────────
        self.context.ingest_media_results(&mut self.viewer, ctx);
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        self.pending_cmds.extend(shortcut_commands(ctx));
    }
}

/// Space toggles play, ←/→ skip 5 s, Shift+←/→ skip 10 s.
/// Nothing while a widget holds keyboard focus.
fn shortcut_commands(ctx: &egui::Context) -> Vec<ViewerCommand> {
    if ctx.memory(|m| m.focused().is_some()) {
        return Vec::new();
    }
    let (space, left, right, shift) = ctx.input(|i| (
        i.key_pressed(egui::Key::Space),
        i.key_pressed(egui::Key::ArrowLeft),
        i.key_pressed(egui::Key::ArrowRight),
        i.modifiers.shift,
    ));
    let step = if shift { 10.0 } else { 5.0 };
    let mut cmds = Vec::new();
    if space { cmds.push(ViewerCommand::TogglePlay); }
    if left  { cmds.push(ViewerCommand::Skip(-step)); }
    if right { cmds.push(ViewerCommand::Skip(step)); }
    cmds
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for DualScopeApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.context.media_worker.shutdown();
        self.viewer.dispose();
        info!("[app] session closed");
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_media(ctx);
        self.handle_shortcuts(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(egui::RichText::new(&self.heading).strong().size(22.0).color(ACCENT));
            ui.add_space(6.0);

            self.transport.ui(ui, &self.viewer, &self.context, &mut self.pending_cmds);
            ui.add_space(12.0);

            ui.horizontal_top(|ui| {
                let col_w = (ui.available_width() - COLUMN_GAP - crate::modules::readout::MIN_W)
                    .clamp(160.0, crate::modules::decks::MAX_W);
                ui.vertical(|ui| {
                    ui.set_width(col_w);
                    self.scrub.ui(ui, &self.viewer, &self.context, &mut self.pending_cmds);
                    ui.add_space(4.0);
                    self.decks.ui(ui, &self.viewer, &self.context, &mut self.pending_cmds);
                });
                ui.add_space(COLUMN_GAP);
                ui.vertical(|ui| {
                    self.readout.ui(ui, &self.viewer, &self.context, &mut self.pending_cmds);
                });
            });
        });

        // ── Process commands emitted by modules this frame ────────────────────
        let cmds: Vec<ViewerCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd);
        }

        // ── Advance the clocks, then let the decoders follow ──────────────────
        let dt = ctx.input(|i| i.stable_dt as f64);
        self.viewer.tick(dt);
        VideoModule::tick(&self.viewer, &mut self.context);

        if !self.viewer.primary().is_paused() || !self.viewer.secondary().is_paused() {
            ctx.request_repaint();
        } else {
            // Keep draining the worker channels while idle.
            ctx.request_repaint_after(IDLE_POLL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dualscope_core::player::DeckId;
    use dualscope_core::viewer::ViewerEvent;
    use egui::{Event, Key, Modifiers, RawInput};

    fn key(key: Key, modifiers: Modifiers) -> Event {
        Event::Key { key, physical_key: None, pressed: true, repeat: false, modifiers }
    }

    fn pass(ctx: &egui::Context, events: Vec<Event>, modifiers: Modifiers) -> Vec<ViewerCommand> {
        let mut cmds = Vec::new();
        let input = RawInput { events, modifiers, ..Default::default() };
        let _ = ctx.run(input, |ctx| cmds = shortcut_commands(ctx));
        cmds
    }

    #[test]
    fn no_keys_no_commands() {
        let ctx = egui::Context::default();
        for _ in 0..5 {
            assert!(pass(&ctx, Vec::new(), Modifiers::NONE).is_empty());
        }
    }

    #[test]
    fn keys_map_to_transport_commands() {
        let ctx = egui::Context::default();
        assert_eq!(pass(&ctx, vec![key(Key::Space, Modifiers::NONE)], Modifiers::NONE),
                   vec![ViewerCommand::TogglePlay]);
        assert_eq!(pass(&ctx, vec![key(Key::ArrowLeft, Modifiers::NONE)], Modifiers::NONE),
                   vec![ViewerCommand::Skip(-5.0)]);
        assert_eq!(pass(&ctx, vec![key(Key::ArrowRight, Modifiers::SHIFT)], Modifiers::SHIFT),
                   vec![ViewerCommand::Skip(10.0)]);
    }

    #[test]
    fn shortcuts_drive_a_live_viewer() {
        let ctx = egui::Context::default();
        let trace = ValueTrace::new((0..=100).collect()).unwrap();
        let mut viewer = SyncViewer::new(trace, PlaybackClock::new(), PlaybackClock::new());
        viewer.attach_sources();
        viewer.dispatch(ViewerEvent::MetadataLoaded { deck: DeckId::Primary, duration: 100.0 });

        let apply = |viewer: &mut SyncViewer, cmds: Vec<ViewerCommand>| {
            for cmd in cmds {
                match cmd {
                    ViewerCommand::TogglePlay => viewer.toggle_play(),
                    ViewerCommand::Skip(d)    => { viewer.skip(d).unwrap(); }
                    other                     => panic!("unexpected {other:?}"),
                }
            }
        };

        apply(&mut viewer, pass(&ctx, vec![key(Key::ArrowRight, Modifiers::SHIFT)], Modifiers::SHIFT));
        assert_eq!(viewer.primary().current_time(), 10.0);
        assert_eq!(viewer.readout().percent(), Some(10));

        apply(&mut viewer, pass(&ctx, vec![key(Key::Space, Modifiers::NONE)], Modifiers::NONE));
        for _ in 0..60 {
            apply(&mut viewer, pass(&ctx, Vec::new(), Modifiers::NONE));
            viewer.tick(1.0 / 60.0);
        }
        assert!(!viewer.primary().is_paused());
        assert!((viewer.primary().current_time() - 11.0).abs() < 1e-6);
    }
}
