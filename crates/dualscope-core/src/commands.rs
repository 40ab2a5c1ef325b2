// crates/dualscope-core/src/commands.rs
//
// Every user action in DualScope is expressed as a ViewerCommand.
// UI modules emit these; app.rs applies them to the SyncViewer after the UI pass.

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerCommand {
    // ── Shared transport ─────────────────────────────────────────────────────
    TogglePlay,
    /// Relative jump in seconds (negative = back).
    Skip(f64),
    /// Absolute jump from the scrub bar.
    Seek(f64),

    // ── Secondary deck's own control ─────────────────────────────────────────
    ToggleSecondary,
}

/// The four skip buttons, left to right around play/pause.
pub const SKIP_STEPS: [f64; 4] = [-10.0, -5.0, 5.0, 10.0];
