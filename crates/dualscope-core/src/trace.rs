// crates/dualscope-core/src/trace.rs
//
// The error-probability trace and the time → sample mapping.
//
// The trace is assumed to span exactly the primary video's duration: sample 0
// is t = 0 and sample L-1 is t = duration, whatever the real sampling rate of
// the diagnostic run was. The mapping is proportional, not a fixed time step.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TraceError {
    #[error("value trace must contain at least one sample")]
    Empty,
}

/// Fixed-length, immutable sequence of integer percentages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueTrace {
    values: Vec<i32>,
}

impl ValueTrace {
    pub fn new(values: Vec<i32>) -> Result<Self, TraceError> {
        if values.is_empty() {
            return Err(TraceError::Empty);
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[i32] {
        &self.values
    }

    pub fn get(&self, idx: usize) -> Option<i32> {
        self.values.get(idx).copied()
    }

    /// Sample index for playback position `t` of a video lasting `duration`.
    pub fn index_at(&self, t: f64, duration: f64) -> usize {
        lookup_index(t, duration, self.values.len())
    }

    /// Sample value for playback position `t` of a video lasting `duration`.
    pub fn value_at(&self, t: f64, duration: f64) -> i32 {
        self.values[self.index_at(t, duration)]
    }
}

/// `floor(t / duration * (len - 1))`, saturated to `[0, len - 1]`.
///
/// A zero or unknown duration produces NaN/inf internally; NaN saturates to 0
/// and +inf to the last sample, so the call never panics or indexes out of
/// range. `len == 0` returns 0.
///
/// ```
/// use dualscope_core::trace::lookup_index;
/// assert_eq!(lookup_index(0.0,    113.9, 1139), 0);
/// assert_eq!(lookup_index(56.95,  113.9, 1139), 569);
/// assert_eq!(lookup_index(113.9,  113.9, 1139), 1138);
/// assert_eq!(lookup_index(500.0,  113.9, 1139), 1138);
/// assert_eq!(lookup_index(-1.0,   113.9, 1139), 0);
/// ```
pub fn lookup_index(t: f64, duration: f64, len: usize) -> usize {
    let Some(last) = len.checked_sub(1) else { return 0 };
    let raw = (t / duration * last as f64).floor();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else if raw >= last as f64 {
        last
    } else {
        raw as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> ValueTrace {
        ValueTrace::new((0..len as i32).collect()).unwrap()
    }

    #[test]
    fn empty_trace_is_rejected() {
        assert_eq!(ValueTrace::new(Vec::new()), Err(TraceError::Empty));
    }

    #[test]
    fn matches_formula_over_whole_range() {
        let (d, len) = (100.0_f64, 1139usize);
        let mut t = 0.0;
        while t < d {
            let expected = ((t / d * (len - 1) as f64).floor() as usize).min(len - 1);
            assert_eq!(lookup_index(t, d, len), expected, "t = {t}");
            t += 0.037;
        }
    }

    #[test]
    fn index_is_monotonic_in_time() {
        let (d, len) = (42.5_f64, 300usize);
        let mut prev = 0;
        for step in 0..=4250 {
            let idx = lookup_index(step as f64 / 100.0, d, len);
            assert!(idx >= prev, "index went backwards at step {step}");
            prev = idx;
        }
        assert_eq!(prev, len - 1);
    }

    #[test]
    fn endpoints() {
        assert_eq!(lookup_index(0.0, 100.0, 1139), 0);
        assert_eq!(lookup_index(100.0, 100.0, 1139), 1138);
        // Just short of the end lands on the penultimate sample with this mapping.
        assert_eq!(lookup_index(100.0 - 1e-6, 100.0, 1139), 1137);
    }

    #[test]
    fn midpoint_scenario() {
        let trace = ramp(1139);
        assert_eq!(trace.index_at(56.95, 113.9), 569);
        assert_eq!(trace.value_at(56.95, 113.9), 569);
    }

    #[test]
    fn degenerate_inputs_stay_in_range() {
        assert_eq!(lookup_index(0.0, 0.0, 10), 0);
        assert_eq!(lookup_index(3.0, 0.0, 10), 9);
        assert_eq!(lookup_index(f64::NAN, 10.0, 10), 0);
        assert_eq!(lookup_index(5.0, 10.0, 0), 0);
        assert_eq!(lookup_index(5.0, 10.0, 1), 0);
    }
}
