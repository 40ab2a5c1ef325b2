// crates/dualscope-ui/src/modules/mod.rs
//
// Module registry. To add a new panel:
//   1. Create modules/mypanel.rs implementing ViewerModule
//   2. Add `pub mod mypanel;` below
//   3. Add a field for it on DualScopeApp and call ui() from update()

pub mod decks;
pub mod readout;
pub mod scrub;
pub mod transport;
pub mod video_module;

use dualscope_core::commands::ViewerCommand;
use dualscope_core::viewer::SyncViewer;
use egui::Ui;

use crate::context::AppContext;

/// Every panel implements this trait.
/// Modules read the viewer, emit commands. They never mutate it directly.
pub trait ViewerModule {
    fn name(&self) -> &str;
    fn ui(
        &mut self,
        ui:     &mut Ui,
        viewer: &SyncViewer,
        ctx:    &AppContext,
        cmd:    &mut Vec<ViewerCommand>,
    );
}
