// crates/dualscope-ui/src/modules/transport.rs
//
// The shared transport row: fast rewind, back 5 s, play/pause, forward 5 s,
// fast forward. Painted icons on fixed-size buttons, centred in the row.
// Skip buttons stay greyed out until the viewer is Ready.

use egui::{Color32, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2};

use dualscope_core::commands::{ViewerCommand, SKIP_STEPS};
use dualscope_core::player::Player;
use dualscope_core::viewer::SyncViewer;

use super::ViewerModule;
use crate::context::AppContext;
use crate::theme::{ACCENT, DARK_BG_2, DARK_BG_3};

// ── Layout constants ─────────────────────────────────────────────────────────
const BAR_H:    f32 = 48.0;
const BTN_SIZE: f32 = 36.0;
const BTN_R:    f32 = 4.0;
const ICON_SZ:  f32 = 9.0;
const GAP:      f32 = 16.0;
// 5 buttons × 36 + 4 gaps × 16
const CONTENT_W: f32 = 5.0 * BTN_SIZE + 4.0 * GAP;

#[derive(Clone, Copy)]
enum Icon {
    /// Double triangle, pointing left (-1) or right (+1).
    Fast(f32),
    /// Single triangle.
    Step(f32),
    PlayPause { playing: bool },
}

/// One tooltip per button, left to right.
const TOOLTIPS: [&str; 5] = ["Fast rewind", "Back 5 s", "Play/Pause", "Forward 5 s", "Fast forward"];

#[derive(Default)]
pub struct TransportModule;

impl ViewerModule for TransportModule {
    fn name(&self) -> &str { "Transport" }

    fn ui(&mut self, ui: &mut Ui, viewer: &SyncViewer, _ctx: &AppContext, cmd: &mut Vec<ViewerCommand>) {
        let (bar_rect, _) = ui.allocate_exact_size(
            Vec2::new(ui.available_width(), BAR_H), Sense::hover());

        let ready   = viewer.is_ready();
        let playing = !viewer.primary().is_paused();
        let cy      = bar_rect.center().y;
        let x0      = bar_rect.center().x - CONTENT_W / 2.0;

        let buttons: [(Icon, ViewerCommand); 5] = [
            (Icon::Fast(-1.0),            ViewerCommand::Skip(SKIP_STEPS[0])),
            (Icon::Step(-1.0),            ViewerCommand::Skip(SKIP_STEPS[1])),
            (Icon::PlayPause { playing }, ViewerCommand::TogglePlay),
            (Icon::Step(1.0),             ViewerCommand::Skip(SKIP_STEPS[2])),
            (Icon::Fast(1.0),             ViewerCommand::Skip(SKIP_STEPS[3])),
        ];

        for (i, (icon, action)) in buttons.into_iter().enumerate() {
            let x = x0 + i as f32 * (BTN_SIZE + GAP);
            let r = Rect::from_min_size(Pos2::new(x, cy - BTN_SIZE / 2.0), Vec2::splat(BTN_SIZE));
            // Play/pause is always live; skips need a known duration.
            let enabled = ready || matches!(icon, Icon::PlayPause { .. });
            let active  = matches!(icon, Icon::PlayPause { playing: true });

            let sense = if enabled { Sense::click() } else { Sense::hover() };
            let resp  = ui.interact(r, ui.id().with(("transport", i)), sense)
                .on_hover_text(TOOLTIPS[i]);

            let (bg, icol) = if !enabled {
                (DARK_BG_3, Color32::from_gray(70))
            } else if resp.is_pointer_button_down_on() {
                (DARK_BG_2.gamma_multiply(0.6), Color32::WHITE)
            } else if resp.hovered() {
                (DARK_BG_2, ACCENT.linear_multiply(1.2))
            } else if active {
                (DARK_BG_3, ACCENT)
            } else {
                (DARK_BG_3, Color32::from_gray(175))
            };

            let painter = ui.painter();
            painter.rect_filled(r, BTN_R, bg);
            if enabled && (resp.hovered() || active) {
                painter.rect_stroke(r, BTN_R,
                    Stroke::new(1.0, ACCENT.gamma_multiply(0.35)),
                    egui::StrokeKind::Outside);
            }
            paint_icon(painter, icon, r.center(), icol);

            if enabled && resp.clicked() {
                cmd.push(action);
            }
        }
    }
}

fn triangle(c: Pos2, dir: f32, col: Color32) -> Shape {
    Shape::convex_polygon(vec![
        Pos2::new(c.x - dir * ICON_SZ * 0.5, c.y - ICON_SZ * 0.8),
        Pos2::new(c.x - dir * ICON_SZ * 0.5, c.y + ICON_SZ * 0.8),
        Pos2::new(c.x + dir * ICON_SZ * 0.5, c.y),
    ], col, Stroke::NONE)
}

fn paint_icon(painter: &egui::Painter, icon: Icon, c: Pos2, col: Color32) {
    match icon {
        Icon::Fast(dir) => {
            painter.add(triangle(Pos2::new(c.x - ICON_SZ * 0.5, c.y), dir, col));
            painter.add(triangle(Pos2::new(c.x + ICON_SZ * 0.5, c.y), dir, col));
        }
        Icon::Step(dir) => {
            painter.add(triangle(c, dir, col));
        }
        Icon::PlayPause { playing: true } => {
            // Two bars = pause
            for ox in [-ICON_SZ * 0.45, ICON_SZ * 0.45] {
                painter.rect_filled(
                    Rect::from_center_size(Pos2::new(c.x + ox, c.y), Vec2::new(3.0, ICON_SZ * 1.8)),
                    1.0, col);
            }
        }
        Icon::PlayPause { playing: false } => {
            painter.add(Shape::convex_polygon(vec![
                Pos2::new(c.x - ICON_SZ * 0.5, c.y - ICON_SZ),
                Pos2::new(c.x - ICON_SZ * 0.5, c.y + ICON_SZ),
                Pos2::new(c.x + ICON_SZ,       c.y),
            ], col, Stroke::NONE));
        }
    }
}
