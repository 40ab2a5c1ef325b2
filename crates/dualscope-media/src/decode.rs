// crates/dualscope-media/src/decode.rs
//
// LiveDecoder: stateful per-deck decoder that avoids re-open/seek every frame.
// Used by both the still-frame thread (paused seeks) and the playback thread.

use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::{input, Pixel};
use ffmpeg::media::Type;
use ffmpeg::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg::util::frame::video::Video as VideoFrame;

use dualscope_core::player::DeckId;

/// Output width of decoded RGBA frames. Height follows the source aspect.
const OUT_W: u32 = 640;

/// Where a keyframe seek left the demuxer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekLanding {
    /// Target at or before 0: a fresh context is already there.
    Start,
    /// On the keyframe at or before the target.
    Keyframe,
    /// Seek refused; decoding continues from the start of the file.
    Failed,
}

pub struct LiveDecoder {
    deck:          DeckId,
    pub path:      PathBuf,
    ictx:          ffmpeg::format::context::Input,
    decoder:       ffmpeg::decoder::video::Video,
    scaler:        SwsContext,
    video_idx:     usize,
    pub last_pts:  i64,
    tb_num:        i32,
    tb_den:        i32,
    pub out_w:     u32,
    pub out_h:     u32,
    /// First frame at or past the burn target, decoded but not yet scaled.
    pending:       Option<VideoFrame>,
}

impl LiveDecoder {
    /// Open `path` and position the demuxer on the keyframe at or before
    /// `timestamp`. Call `burn_to_pts` to land exactly on it.
    pub fn open(deck: DeckId, path: &Path, timestamp: f64) -> Result<Self> {
        let ictx = input(path)?;
        let video_idx = ictx.streams().best(Type::Video)
            .ok_or_else(|| anyhow::anyhow!("no video stream"))?.index();

        let (tb_num, tb_den, dec_ctx) = {
            let stream = ictx.stream(video_idx)
                .ok_or_else(|| anyhow::anyhow!("stream gone"))?;
            let tb = stream.time_base();
            let dec_ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())?;
            (tb.numerator(), tb.denominator(), dec_ctx)
        };
        anyhow::ensure!(tb_num > 0 && tb_den > 0, "invalid stream time base {tb_num}/{tb_den}");
        let decoder = dec_ctx.decoder().video()?;

        let (out_w, out_h) = output_size(decoder.width(), decoder.height());
        let scaler = SwsContext::get(
            decoder.format(), decoder.width(), decoder.height(),
            Pixel::RGBA, out_w, out_h, Flags::BILINEAR,
        )?;

        let mut d = Self {
            deck, path: path.to_path_buf(), ictx, decoder, scaler, video_idx,
            last_pts: 0, tb_num, tb_den, out_w, out_h, pending: None,
        };
        let landing = d.seek_near(timestamp);
        debug!("[decode] {} opened at {timestamp:.3}s: {landing:?}", deck.label());
        Ok(d)
    }

    /// Container seek to the keyframe at or before `secs`. A refused seek is
    /// not fatal: `burn_to_pts` decodes forward from wherever the demuxer is.
    fn seek_near(&mut self, secs: f64) -> SeekLanding {
        self.last_pts = self.ts_to_pts(secs.max(0.0));
        let Some(target) = container_ts(secs) else { return SeekLanding::Start };
        match self.ictx.seek(target, ..=target) {
            Ok(()) => SeekLanding::Keyframe,
            Err(e) => {
                warn!(
                    "[decode] {} seek to pts {} ({secs:.3}s) refused: {e}",
                    self.deck.label(), self.last_pts,
                );
                self.last_pts = 0;
                SeekLanding::Failed
            }
        }
    }

    pub fn ts_to_pts(&self, t: f64) -> i64 {
        (t * self.tb_den as f64 / self.tb_num as f64) as i64
    }

    pub fn pts_to_secs(&self, pts: i64) -> f64 {
        pts as f64 * self.tb_num as f64 / self.tb_den as f64
    }

    /// Decode (without scaling) until a frame at or past `target_pts`, and
    /// hold it for the next `next_frame` call. Pre-roll frames from the
    /// keyframe seek are dropped here. If the stream ends first, the last
    /// frame is held instead so a target past the end still has a picture.
    ///
    /// Returns how many frames were decoded and dropped on the way.
    pub fn burn_to_pts(&mut self, target_pts: i64) -> usize {
        let mut decoded   = VideoFrame::empty();
        let mut last      = VideoFrame::empty();
        let mut burned    = 0usize;
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx { continue; }
            if self.decoder.send_packet(&packet).is_err() { continue; }
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                if pts >= target_pts {
                    debug!("[decode] {} burned {burned} frames to pts {target_pts}", self.deck.label());
                    self.pending = Some(decoded);
                    return burned;
                }
                // receive_frame unrefs whatever buffer it is handed.
                std::mem::swap(&mut last, &mut decoded);
                burned += 1;
            }
        }
        debug!("[decode] {} hit end of stream before pts {target_pts}", self.deck.label());
        if burned > 0 {
            self.pending = Some(last);
            burned -= 1;
        }
        burned
    }

    /// Decode the next frame sequentially (no seek).
    /// Returns `(pixels, w, h, ts_secs)` or None at EOF.
    pub fn next_frame(&mut self) -> Option<(Vec<u8>, u32, u32, f64)> {
        if let Some(held) = self.pending.take() {
            let ts = self.pts_to_secs(held.pts().unwrap_or(self.last_pts));
            let data = to_rgba(&mut self.scaler, &held, self.out_w, self.out_h)?;
            return Some((data, self.out_w, self.out_h, ts));
        }
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx { continue; }
            if self.decoder.send_packet(&packet).is_err() { continue; }
            let mut decoded = VideoFrame::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                let ts_secs = pts as f64 * self.tb_num as f64 / self.tb_den as f64;
                let data = to_rgba(&mut self.scaler, &decoded, self.out_w, self.out_h)?;
                return Some((data, self.out_w, self.out_h, ts_secs));
            }
        }
        None
    }

    /// Read forward until a frame at or past `target_pts`. Returns RGBA pixels.
    /// At EOF returns the last frame seen, so a seek past the end still
    /// shows the final picture.
    pub fn advance_to(&mut self, target_pts: i64) -> Option<(Vec<u8>, u32, u32)> {
        let mut last_good: Option<VideoFrame> = self.pending.take();
        if last_good.as_ref().and_then(|f| f.pts()).is_some_and(|p| p >= target_pts) {
            let held = last_good?;
            let data = to_rgba(&mut self.scaler, &held, self.out_w, self.out_h)?;
            return Some((data, self.out_w, self.out_h));
        }
        for (stream, packet) in self.ictx.packets().flatten() {
            if stream.index() != self.video_idx { continue; }
            if self.decoder.send_packet(&packet).is_err() { continue; }
            let mut decoded = VideoFrame::empty();
            while self.decoder.receive_frame(&mut decoded).is_ok() {
                let pts = decoded.pts().unwrap_or(self.last_pts + 1);
                self.last_pts = pts;
                if pts < target_pts {
                    last_good = Some(decoded.clone());
                    continue;
                }
                let data = to_rgba(&mut self.scaler, &decoded, self.out_w, self.out_h)?;
                return Some((data, self.out_w, self.out_h));
            }
        }
        let tail = last_good?;
        let data = to_rgba(&mut self.scaler, &tail, self.out_w, self.out_h)?;
        Some((data, self.out_w, self.out_h))
    }
}

/// Container-level seek timestamp (AV_TIME_BASE units) for `secs`, or None
/// when no seek is needed.
fn container_ts(secs: f64) -> Option<i64> {
    (secs.is_finite() && secs > 0.0)
        .then(|| (secs * ffmpeg::ffi::AV_TIME_BASE as f64) as i64)
}

/// Scale `frame` to packed RGBA, dropping stride padding.
fn to_rgba(scaler: &mut SwsContext, frame: &VideoFrame, out_w: u32, out_h: u32) -> Option<Vec<u8>> {
    let mut out = VideoFrame::empty();
    scaler.run(frame, &mut out).ok()?;
    let stride    = out.stride(0);
    let raw       = out.data(0);
    let row_bytes = out_w as usize * 4;
    Some(
        (0..out_h as usize)
            .flat_map(|row| &raw[row * stride..row * stride + row_bytes])
            .copied()
            .collect(),
    )
}

/// Output dimensions for a `src_w` × `src_h` source: at most `OUT_W` wide,
/// aspect preserved, both sides even and at least 2.
pub fn output_size(src_w: u32, src_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (OUT_W, OUT_W * 9 / 16);
    }
    let w = (src_w.min(OUT_W) & !1).max(2);
    let h = ((w as u64 * src_h as u64 / src_w as u64) as u32 & !1).max(2);
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_of_file_needs_no_seek() {
        assert_eq!(container_ts(0.0), None);
        assert_eq!(container_ts(-1.0), None);
        assert_eq!(container_ts(f64::NAN), None);
    }

    #[test]
    fn seek_targets_use_microseconds() {
        assert_eq!(container_ts(1.5), Some(1_500_000));
        assert_eq!(container_ts(113.9), Some(113_900_000));
    }

    #[test]
    fn opening_a_missing_file_fails() {
        assert!(LiveDecoder::open(DeckId::Primary, Path::new("/no/such/clip.mp4"), 0.0).is_err());
    }

    #[test]
    fn full_hd_scales_to_640_wide() {
        assert_eq!(output_size(1920, 1080), (640, 360));
    }

    #[test]
    fn small_sources_keep_their_width() {
        assert_eq!(output_size(320, 240), (320, 240));
    }

    #[test]
    fn odd_dimensions_round_down_to_even() {
        let (w, h) = output_size(637, 481);
        assert_eq!(w % 2, 0);
        assert_eq!(h % 2, 0);
        assert_eq!(w, 636);
    }

    #[test]
    fn unknown_size_falls_back_to_16_9() {
        assert_eq!(output_size(0, 0), (640, 360));
    }
}
