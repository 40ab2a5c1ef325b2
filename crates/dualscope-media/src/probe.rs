// crates/dualscope-media/src/probe.rs
//
// In-process FFmpeg probing: duration and video dimensions.
// The Duration result is the deck's "metadata loaded" signal.

use std::path::Path;

use crossbeam_channel::Sender;
use tracing::{info, warn};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::input;
use ffmpeg::media::Type;

use dualscope_core::media_types::MediaResult;
use dualscope_core::player::DeckId;

/// Probe `path` and report its duration and frame size on `tx`.
/// Any failure is reported as `MediaResult::Error`; the deck then stays
/// without metadata.
pub fn probe_media(path: &Path, deck: DeckId, tx: &Sender<MediaResult>) {
    let ctx = match input(path) {
        Ok(ctx) => ctx,
        Err(e) => {
            warn!("[probe] {} open failed: {e}", deck.label());
            let _ = tx.send(MediaResult::Error { deck, msg: e.to_string() });
            return;
        }
    };

    let video = ctx.streams().best(Type::Video);

    if let Some(stream) = &video {
        let dec = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .ok()
            .and_then(|c| c.decoder().video().ok());
        if let Some(dec) = dec {
            let (w, h) = (dec.width(), dec.height());
            if w > 0 && h > 0 {
                info!("[probe] {} video size {w}x{h}", deck.label());
                let _ = tx.send(MediaResult::VideoSize { deck, width: w, height: h });
            }
        }
    }

    let container = ctx.duration() as f64 / ffmpeg::ffi::AV_TIME_BASE as f64;
    // Fall back to the video stream's own duration.
    let seconds = if container > 0.0 {
        container
    } else {
        video.as_ref().map_or(0.0, |s| {
            let tb = s.time_base();
            s.duration() as f64 * tb.numerator() as f64 / tb.denominator().max(1) as f64
        })
    };

    if seconds.is_finite() && seconds > 0.0 {
        info!("[probe] {} duration {seconds:.2}s ← {}", deck.label(), path.display());
        let _ = tx.send(MediaResult::Duration { deck, seconds });
    } else {
        warn!("[probe] {} duration unknown", deck.label());
        let _ = tx.send(MediaResult::Error { deck, msg: "duration unknown".into() });
    }
}
