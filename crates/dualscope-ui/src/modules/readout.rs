// crates/dualscope-ui/src/modules/readout.rs
//
// Error-probability readout box, right of the videos.

use egui::{Align, CornerRadius, Frame, Layout, Margin, RichText, Stroke, Ui};

use dualscope_core::commands::ViewerCommand;
use dualscope_core::viewer::{Readout, SyncViewer};

use super::ViewerModule;
use crate::context::AppContext;
use crate::theme::{level_color, DARK_BORDER, DARK_TEXT_DIM};

pub const MIN_W: f32 = 260.0;
const TEXT_SZ:   f32 = 26.0;

pub struct ReadoutModule {
    label: String,
}

impl ReadoutModule {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

/// `"<label>: N %"`, or `"<label>: -- %"` before the first lookup.
pub fn readout_text(label: &str, readout: Readout) -> String {
    format!("{label}: {readout} %")
}

impl ViewerModule for ReadoutModule {
    fn name(&self) -> &str { "Readout" }

    fn ui(&mut self, ui: &mut Ui, viewer: &SyncViewer, _ctx: &AppContext, _cmd: &mut Vec<ViewerCommand>) {
        let readout = viewer.readout();
        let color = readout.percent().map_or(DARK_TEXT_DIM, level_color);

        Frame::new()
            .stroke(Stroke::new(1.0, DARK_BORDER))
            .corner_radius(CornerRadius::same(10))
            .inner_margin(Margin::symmetric(12, 24))
            .show(ui, |ui| {
                ui.set_min_width(MIN_W);
                ui.with_layout(Layout::top_down(Align::Center), |ui| {
                    ui.label(
                        RichText::new(readout_text(&self.label, readout))
                            .size(TEXT_SZ)
                            .color(color),
                    );
                });
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_readout_shows_dashes() {
        assert_eq!(readout_text("Error probability", Readout::Pending), "Error probability: -- %");
    }

    #[test]
    fn value_readout_shows_percent() {
        assert_eq!(readout_text("Error probability", Readout::Percent(42)), "Error probability: 42 %");
    }
}
