// crates/dualscope-ui/src/modules/decks.rs
//
// The two video boxes, stacked. Each box is a fixed 16:9 frame: the picture
// is scaled to cover it, then the configured insets are cut from each edge
// (the recorded footage has a black border baked in).
//
// The secondary box is clickable: a click toggles the secondary on its own,
// the same as its native play control.

use egui::{Color32, Pos2, Rect, Sense, Stroke, Ui, Vec2};

use dualscope_core::commands::ViewerCommand;
use dualscope_core::config::CropInsets;
use dualscope_core::player::{DeckId, Player};
use dualscope_core::viewer::SyncViewer;

use super::ViewerModule;
use crate::context::{AppContext, DeckContext};
use crate::theme::{ACCENT, DARK_BORDER};

pub const MAX_W:  f32 = 700.0;
pub const BOX_GAP: f32 = 8.0;
const BOX_ASPECT: f32 = 16.0 / 9.0;

pub struct DecksModule {
    crop: CropInsets,
}

impl DecksModule {
    pub fn new(crop: CropInsets) -> Self {
        Self { crop }
    }
}

impl ViewerModule for DecksModule {
    fn name(&self) -> &str { "Decks" }

    fn ui(&mut self, ui: &mut Ui, viewer: &SyncViewer, ctx: &AppContext, cmd: &mut Vec<ViewerCommand>) {
        let w = ui.available_width().min(MAX_W);
        let h = w / BOX_ASPECT;

        for (i, deck) in DeckId::ALL.into_iter().enumerate() {
            if i > 0 {
                ui.add_space(BOX_GAP);
            }
            let sense = match deck {
                DeckId::Primary   => Sense::hover(),
                DeckId::Secondary => Sense::click(),
            };
            let (rect, resp) = ui.allocate_exact_size(Vec2::new(w, h), sense);
            let playing = !viewer.deck(deck).is_paused();
            self.paint_box(ui, rect, ctx.deck(deck), playing);

            if deck == DeckId::Secondary {
                let resp = resp.on_hover_text(if playing { "Pause secondary" } else { "Play secondary" });
                if resp.clicked() {
                    cmd.push(ViewerCommand::ToggleSecondary);
                }
            }
        }
    }
}

impl DecksModule {
    fn paint_box(&self, ui: &Ui, rect: Rect, dc: &DeckContext, playing: bool) {
        let painter = ui.painter_at(rect.expand(2.0));
        painter.rect_filled(rect, 0.0, Color32::BLACK);

        if let Some(tex) = &dc.frame {
            let size = tex.size_vec2();
            let src_aspect = dc.aspect().unwrap_or(size.x / size.y.max(1.0));
            let (screen, uv) = crop(rect, cover_uv(src_aspect, BOX_ASPECT), self.crop);
            painter.image(tex.id(), screen, uv, Color32::WHITE);
        } else {
            let text = dc.error.as_deref().unwrap_or("NO SIGNAL");
            painter.text(rect.center(), egui::Align2::CENTER_CENTER,
                text, egui::FontId::monospace(14.0), Color32::from_gray(70));
        }

        let stroke = if playing {
            Stroke::new(1.5, ACCENT.gamma_multiply(0.55))
        } else {
            Stroke::new(1.0, DARK_BORDER)
        };
        painter.rect_stroke(rect, 0.0, stroke, egui::StrokeKind::Inside);
    }
}

/// UV sub-rect of a `src_aspect` image that covers a `box_aspect` box,
/// centred, trimming whichever axis overflows.
pub fn cover_uv(src_aspect: f32, box_aspect: f32) -> Rect {
    if !(src_aspect.is_finite() && src_aspect > 0.0) {
        return Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
    }
    if src_aspect > box_aspect {
        // Too wide: keep full height, trim the sides.
        let frac = box_aspect / src_aspect;
        let m = (1.0 - frac) / 2.0;
        Rect::from_min_max(Pos2::new(m, 0.0), Pos2::new(1.0 - m, 1.0))
    } else {
        let frac = src_aspect / box_aspect;
        let m = (1.0 - frac) / 2.0;
        Rect::from_min_max(Pos2::new(0.0, m), Pos2::new(1.0, 1.0 - m))
    }
}

/// Cut the insets from the box: the clipped screen rect and the matching UV.
pub fn crop(screen: Rect, uv: Rect, c: CropInsets) -> (Rect, Rect) {
    let inset = |r: Rect| Rect::from_min_max(
        Pos2::new(r.min.x + r.width() * c.left,  r.min.y + r.height() * c.top),
        Pos2::new(r.max.x - r.width() * c.right, r.max.y - r.height() * c.bottom),
    );
    (inset(screen), inset(uv))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Rect, b: Rect) -> bool {
        (a.min - b.min).length() < EPS && (a.max - b.max).length() < EPS
    }

    #[test]
    fn matching_aspect_uses_whole_image() {
        let uv = cover_uv(16.0 / 9.0, BOX_ASPECT);
        assert!(approx(uv, Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0))));
    }

    #[test]
    fn wider_source_trims_the_sides() {
        // 32:9 into 16:9 keeps the middle half.
        let uv = cover_uv(32.0 / 9.0, BOX_ASPECT);
        assert!(approx(uv, Rect::from_min_max(Pos2::new(0.25, 0.0), Pos2::new(0.75, 1.0))));
    }

    #[test]
    fn taller_source_trims_top_and_bottom() {
        let uv = cover_uv(4.0 / 3.0, BOX_ASPECT);
        assert_eq!(uv.min.x, 0.0);
        assert!(uv.min.y > 0.0);
        assert!((uv.min.y + uv.max.y - 1.0).abs() < EPS);
    }

    #[test]
    fn default_insets_cut_each_edge() {
        let screen = Rect::from_min_size(Pos2::ZERO, Vec2::new(700.0, 393.75));
        let full   = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        let (s, uv) = crop(screen, full, CropInsets::default());
        assert!((s.min.x - 49.0).abs() < 1e-3);
        assert!((s.max.x - 658.0).abs() < 1e-3);
        assert_eq!(s.min.y, 0.0);
        assert!((uv.max.y - 0.91).abs() < EPS);
        assert!((uv.min.x - 0.07).abs() < EPS);
    }
}
