#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod context;
mod helpers;
mod modules;
mod paths;
mod theme;

use anyhow::{Context, Result};
use mimalloc::MiMalloc;
use tracing::{error, info};

use dualscope_media::{load_trace, MediaBlob, MediaWorker, TraceLayout};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    helpers::log::init();
    info!("[app] log file: {}", helpers::log::log_path().display());
    run().inspect_err(|e| error!("[app] fatal: {e:#}"))
}

fn run() -> Result<()> {
    let loaded  = paths::load_config(std::env::args_os().nth(1))?;
    ffmpeg_the_third::init().context("FFmpeg init failed")?;
    let session = open_session(loaded)?;

    let native_options = eframe::NativeOptions {
        centered: true,
        viewport: egui::ViewportBuilder::default()
            .with_title(session.config.title.clone())
            .with_inner_size([1100.0, 980.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "DualScope",
        native_options,
        Box::new(move |cc| Ok(Box::new(app::DualScopeApp::new(cc, session)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Load the trace and both videos. Any failure here ends the session.
fn open_session(loaded: paths::LoadedConfig) -> Result<app::Session> {
    let layout = TraceLayout {
        column:      loaded.config.column()?,
        header_rows: loaded.config.header_rows,
        len:         loaded.config.trace_len,
    };
    let trace = load_trace(&loaded.trace_workbook(), layout)?;

    // Both videos are read wholesale, then staged to private temp files for
    // the decoders. The originals are not touched again.
    let primary   = MediaBlob::read(&loaded.primary_video())?.stage()?;
    let secondary = MediaBlob::read(&loaded.secondary_video())?.stage()?;
    info!("[app] staged {} and {}", primary.name, secondary.name);

    let worker = MediaWorker::new(primary.path(), secondary.path())?;

    Ok(app::Session {
        config: loaded.config,
        trace,
        worker,
        staged: [primary, secondary],
    })
}
