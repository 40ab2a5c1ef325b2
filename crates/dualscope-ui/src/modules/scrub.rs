// crates/dualscope-ui/src/modules/scrub.rs
//
// Scrub bar over the primary's duration, 0.05 s resolution, with a
// `current / total` timecode. Disabled until the viewer is Ready; the range
// itself bounds what Seek receives.
//
// The slider snaps its bound value to the step grid on every pass, so a
// change only counts as a seek when it lands on a different grid point than
// the playhead.

use egui::{Response, RichText, Slider, Ui};

use dualscope_core::commands::ViewerCommand;
use dualscope_core::helpers::time::format_position;
use dualscope_core::player::Player;
use dualscope_core::viewer::SyncViewer;

use super::ViewerModule;
use crate::context::AppContext;
use crate::theme::{ACCENT, DARK_TEXT_DIM};

const LABEL_W: f32 = 150.0;

#[derive(Default)]
pub struct ScrubModule;

impl ViewerModule for ScrubModule {
    fn name(&self) -> &str { "Scrub" }

    fn ui(&mut self, ui: &mut Ui, viewer: &SyncViewer, _ctx: &AppContext, cmd: &mut Vec<ViewerCommand>) {
        show(ui, viewer, cmd);
    }
}

/// Draw the bar and push a `Seek` for a real move. Returns the slider response.
pub fn show(ui: &mut Ui, viewer: &SyncViewer, cmd: &mut Vec<ViewerCommand>) -> Response {
    let scrub = viewer.scrub();
    let ready = viewer.is_ready();

    ui.horizontal(|ui| {
        ui.spacing_mut().slider_width = (ui.available_width() - LABEL_W).max(80.0);

        let mut value = scrub.value;
        let slider = Slider::new(&mut value, 0.0..=scrub.max.max(scrub.step))
            .step_by(scrub.step)
            .show_value(false)
            .trailing_fill(true);
        let resp = ui.add_enabled(ready, slider);
        if resp.changed() {
            if let Some(target) = user_seek(scrub.value, value, scrub.step) {
                cmd.push(ViewerCommand::Seek(target));
            }
        }
        // Give the keys back to the transport shortcuts once the pointer lets go.
        if resp.has_focus() && !resp.dragged() {
            resp.surrender_focus();
        }

        let text = format_position(viewer.primary().current_time(), viewer.primary().duration());
        let color = if ready { ACCENT } else { DARK_TEXT_DIM };
        ui.label(RichText::new(text).monospace().size(12.0).color(color));
        resp
    })
    .inner
}

/// `picked` is a seek only if it differs from where the grid puts `playhead`.
fn user_seek(playhead: f64, picked: f64, step: f64) -> Option<f64> {
    let snapped = if step > 0.0 { (playhead / step).round() * step } else { playhead };
    ((picked - snapped).abs() > step * 0.5).then_some(picked)
}
