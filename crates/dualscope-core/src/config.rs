// crates/dualscope-core/src/config.rs
//
// Session configuration: which files to load and how the page looks.
// Plain serde data, no I/O. dualscope-ui reads the JSON file and hands the
// text to `ViewerConfig::from_json`. Every field has a default so a partial
// (or absent) config file is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("'{0}' is not a spreadsheet column (expected letters like \"Z\" or \"AB\")")]
    BadColumn(String),
    #[error("trace_len must be at least 1")]
    EmptyTrace,
    #[error("crop inset '{name}' = {value} is outside [0, 0.5)")]
    BadCrop { name: &'static str, value: f32 },
}

/// Fraction of each edge cut from the displayed frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropInsets {
    pub top:    f32,
    pub right:  f32,
    pub bottom: f32,
    pub left:   f32,
}

impl Default for CropInsets {
    fn default() -> Self {
        // Trims the black border baked into the recorded footage.
        Self { top: 0.0, right: 0.06, bottom: 0.09, left: 0.07 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub primary_video:   PathBuf,
    pub secondary_video: PathBuf,
    pub trace_workbook:  PathBuf,
    /// Spreadsheet column letters holding the trace.
    pub trace_column:    String,
    /// Rows skipped before the first sample.
    pub header_rows:     usize,
    /// Number of samples read; shorter sheets are padded with 0.
    pub trace_len:       usize,
    pub title:           String,
    pub heading:         String,
    pub readout_label:   String,
    pub crop:            CropInsets,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            primary_video:   PathBuf::from("power.mp4"),
            secondary_video: PathBuf::from("high_pressure.mp4"),
            trace_workbook:  PathBuf::from("real_vs_predicted_outputs.xlsx"),
            trace_column:    "Z".into(),
            header_rows:     1,
            trace_len:       1139,
            title:           "Digital Twin: Fault Detection Supervision".into(),
            heading:         "Video Comparator".into(),
            readout_label:   "Error probability".into(),
            crop:            CropInsets::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        column_index(&self.trace_column)?;
        if self.trace_len == 0 {
            return Err(ConfigError::EmptyTrace);
        }
        let c = self.crop;
        for (name, value) in [("top", c.top), ("right", c.right), ("bottom", c.bottom), ("left", c.left)] {
            if !(0.0..0.5).contains(&value) {
                return Err(ConfigError::BadCrop { name, value });
            }
        }
        Ok(())
    }

    /// Zero-based column index of `trace_column`.
    pub fn column(&self) -> Result<usize, ConfigError> {
        column_index(&self.trace_column)
    }
}

/// Zero-based index of a spreadsheet column name (`A` = 0, `Z` = 25, `AA` = 26).
///
/// ```
/// use dualscope_core::config::column_index;
/// assert_eq!(column_index("A").unwrap(),  0);
/// assert_eq!(column_index("z").unwrap(),  25);
/// assert_eq!(column_index("AA").unwrap(), 26);
/// assert_eq!(column_index("AZ").unwrap(), 51);
/// assert!(column_index("").is_err());
/// assert!(column_index("Z1").is_err());
/// ```
pub fn column_index(letters: &str) -> Result<usize, ConfigError> {
    let bad = || ConfigError::BadColumn(letters.to_string());
    let trimmed = letters.trim();
    if trimmed.is_empty() || trimmed.len() > 3 {
        return Err(bad());
    }
    let mut n = 0usize;
    for ch in trimmed.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(bad());
        }
        n = n * 26 + (ch.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Ok(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg = ViewerConfig::from_json("{}").unwrap();
        assert_eq!(cfg, ViewerConfig::default());
        assert_eq!(cfg.column().unwrap(), 25);
        assert_eq!(cfg.trace_len, 1139);
        assert_eq!(cfg.header_rows, 1);
    }

    #[test]
    fn default_window_text_is_ascii() {
        let cfg = ViewerConfig::default();
        assert_eq!(cfg.title, "Digital Twin: Fault Detection Supervision");
        assert!(cfg.title.is_ascii() && cfg.heading.is_ascii() && cfg.readout_label.is_ascii());
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let cfg = ViewerConfig::from_json(
            r#"{ "trace_column": "AB", "trace_len": 20, "crop": { "left": 0.1 } }"#,
        ).unwrap();
        assert_eq!(cfg.column().unwrap(), 27);
        assert_eq!(cfg.trace_len, 20);
        assert_eq!(cfg.crop.left, 0.1);
        assert_eq!(cfg.crop.right, CropInsets::default().right);
        assert_eq!(cfg.heading, "Video Comparator");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            ViewerConfig::from_json(r#"{ "trace_column": "7" }"#),
            Err(ConfigError::BadColumn(_))
        ));
        assert!(matches!(
            ViewerConfig::from_json(r#"{ "trace_len": 0 }"#),
            Err(ConfigError::EmptyTrace)
        ));
        assert!(matches!(
            ViewerConfig::from_json(r#"{ "crop": { "top": 0.7 } }"#),
            Err(ConfigError::BadCrop { name: "top", .. })
        ));
        assert!(matches!(
            ViewerConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
