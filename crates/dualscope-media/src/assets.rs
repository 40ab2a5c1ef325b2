// crates/dualscope-media/src/assets.rs
//
// Startup asset loading: the error-probability trace from a workbook column,
// and both videos read wholesale into memory.
//
// Everything here runs once before the window opens. Any failure is fatal to
// the session: callers propagate with `?` and main() exits.
//
// The decoders need a file path, so each in-memory blob is staged into a
// private temp file owned by the session. After startup nothing touches the
// original paths; the staged copies are deleted when `StagedMedia` drops.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use dualscope_core::trace::ValueTrace;

// ── Trace ─────────────────────────────────────────────────────────────────────

/// Where the trace lives inside the workbook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceLayout {
    /// Zero-based column index.
    pub column:      usize,
    /// Rows skipped before the first sample.
    pub header_rows: usize,
    /// Samples read. Rows missing from the sheet read as 0.
    pub len:         usize,
}

/// Read the first worksheet of `path` and extract the trace column.
pub fn load_trace(path: &Path, layout: TraceLayout) -> Result<ValueTrace> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("workbook {} has no worksheets", path.display()))?
        .with_context(|| format!("reading first worksheet of {}", path.display()))?;

    let values = trace_from_range(&range, layout);
    let blanks = count_blank(&range, layout);
    info!(
        "[assets] trace: {} samples from column {} of {} ({blanks} blank → 0)",
        values.len(), layout.column, path.display(),
    );
    ValueTrace::new(values).context("building value trace")
}

/// Pull `layout.len` cells down `layout.column`, starting after the header.
/// Coordinates are absolute sheet positions, so a range that starts below
/// row 0 or right of column A reads the same cells as the sheet shows.
pub fn trace_from_range(range: &Range<Data>, layout: TraceLayout) -> Vec<i32> {
    (0..layout.len)
        .map(|i| {
            let row = (layout.header_rows + i) as u32;
            cell_to_percent(range.get_value((row, layout.column as u32)))
        })
        .collect()
}

fn count_blank(range: &Range<Data>, layout: TraceLayout) -> usize {
    (0..layout.len)
        .filter(|i| {
            let row = (layout.header_rows + i) as u32;
            as_number(range.get_value((row, layout.column as u32))).is_none()
        })
        .count()
}

/// Numeric cells round half-to-even; blank or non-numeric cells become 0.
pub fn cell_to_percent(cell: Option<&Data>) -> i32 {
    match as_number(cell) {
        // `as` saturates at the i32 bounds.
        Some(v) => v.round_ties_even() as i32,
        None    => 0,
    }
}

fn as_number(cell: Option<&Data>) -> Option<f64> {
    let v = match cell? {
        Data::Int(i)    => *i as f64,
        Data::Float(f)  => *f,
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _               => return None,
    };
    v.is_finite().then_some(v)
}

// ── Media blobs ───────────────────────────────────────────────────────────────

/// A whole video file held in memory.
pub struct MediaBlob {
    pub name:  String,
    extension: String,
    bytes:     Vec<u8>,
}

impl MediaBlob {
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading video {}", path.display()))?;
        anyhow::ensure!(!bytes.is_empty(), "video {} is empty", path.display());
        let name = path.file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let extension = path.extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        debug!("[assets] read {} bytes ← {}", bytes.len(), path.display());
        Ok(Self { name, extension, bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the blob to a session-private temp file. Consumes the blob so the
    /// in-memory copy is released once staged.
    pub fn stage(self) -> Result<StagedMedia> {
        let mut file = tempfile::Builder::new()
            .prefix("dualscope-")
            .suffix(&self.extension)
            .tempfile()
            .context("creating staging file")?;
        file.write_all(&self.bytes).context("writing staging file")?;
        file.flush().context("flushing staging file")?;
        debug!("[assets] staged {} → {}", self.name, file.path().display());
        Ok(StagedMedia { name: self.name, file })
    }
}

/// A staged video. The temp file lives as long as this value.
pub struct StagedMedia {
    pub name: String,
    file:     NamedTempFile,
}

impl StagedMedia {
    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(rows: u32, cols: u32) -> Range<Data> {
        Range::new((0, 0), (rows - 1, cols - 1))
    }

    const LAYOUT: TraceLayout = TraceLayout { column: 25, header_rows: 1, len: 5 };

    #[test]
    fn blank_cell_reads_as_zero() {
        let mut r = sheet(6, 26);
        r.set_value((1, 25), Data::Float(12.0));
        r.set_value((3, 25), Data::Float(40.0));
        assert_eq!(trace_from_range(&r, LAYOUT), vec![12, 0, 40, 0, 0]);
    }

    #[test]
    fn header_row_is_skipped() {
        let mut r = sheet(3, 26);
        r.set_value((0, 25), Data::String("probability".into()));
        r.set_value((1, 25), Data::Int(7));
        let layout = TraceLayout { len: 2, ..LAYOUT };
        assert_eq!(trace_from_range(&r, layout), vec![7, 0]);
    }

    #[test]
    fn rows_past_sheet_end_pad_with_zero() {
        let mut r = sheet(2, 26);
        r.set_value((1, 25), Data::Float(99.0));
        assert_eq!(trace_from_range(&r, LAYOUT), vec![99, 0, 0, 0, 0]);
    }

    #[test]
    fn absolute_coordinates_honour_range_offset() {
        let mut r: Range<Data> = Range::new((1, 25), (2, 25));
        r.set_value((1, 25), Data::Float(5.0));
        r.set_value((2, 25), Data::Float(6.0));
        let layout = TraceLayout { len: 2, ..LAYOUT };
        assert_eq!(trace_from_range(&r, layout), vec![5, 6]);
    }

    #[test]
    fn rounding_is_half_to_even() {
        let cases = [(2.5, 2), (3.5, 4), (-0.5, 0), (12.49, 12), (12.51, 13)];
        for (input, expected) in cases {
            assert_eq!(cell_to_percent(Some(&Data::Float(input))), expected, "{input}");
        }
    }

    #[test]
    fn non_numeric_cells_default_to_zero() {
        assert_eq!(cell_to_percent(None), 0);
        assert_eq!(cell_to_percent(Some(&Data::Empty)), 0);
        assert_eq!(cell_to_percent(Some(&Data::Bool(true))), 0);
        assert_eq!(cell_to_percent(Some(&Data::String("n/a".into()))), 0);
        assert_eq!(cell_to_percent(Some(&Data::Float(f64::NAN))), 0);
        assert_eq!(cell_to_percent(Some(&Data::String(" 42.0 ".into()))), 42);
    }

    #[test]
    fn missing_workbook_is_an_error() {
        let err = load_trace(Path::new("/definitely/not/here.xlsx"), LAYOUT);
        assert!(err.is_err());
    }

    #[test]
    fn blob_stages_to_readable_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("clip.mp4");
        std::fs::write(&src, b"not really a video").unwrap();

        let blob = MediaBlob::read(&src).unwrap();
        assert_eq!(blob.name, "clip.mp4");
        assert_eq!(blob.len(), 18);

        let staged = blob.stage().unwrap();
        let path = staged.path();
        assert_ne!(path, src);
        assert_eq!(path.extension().unwrap(), "mp4");
        assert_eq!(std::fs::read(&path).unwrap(), b"not really a video");

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn missing_or_empty_video_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(MediaBlob::read(&dir.path().join("nope.mp4")).is_err());
        let empty = dir.path().join("empty.mp4");
        std::fs::write(&empty, b"").unwrap();
        assert!(MediaBlob::read(&empty).is_err());
    }
}
