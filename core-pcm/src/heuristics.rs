//! # Signal Heuristics
//!
//! Cheap statistics over a mono preview that flag implausible decodings:
//! flat signals, signals pinned to full scale, and signals whose spread is
//! far too small or too large for real audio.
//!
//! Statistics are accumulated in a single pass in `f64` so previews of any
//! length cost one walk over the samples.

use core_runtime::config::{FilterFlags, HeuristicThresholds};
use serde::{Deserialize, Serialize};

use crate::format::HiddenReason;

/// Summary statistics of a mono signal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalStats {
    pub samples: usize,
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    pub std_dev: f64,
    /// Largest absolute sample value
    pub peak: f64,
    /// Fraction of samples with magnitude above the clip level
    pub clipped_fraction: f64,
}

impl SignalStats {
    pub fn compute(samples: &[f32], clip_level: f32) -> Self {
        if samples.is_empty() {
            return Self::default();
        }

        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        let mut peak = 0.0f64;
        let mut clipped = 0usize;
        for &sample in samples {
            let value = f64::from(sample);
            sum += value;
            sum_sq += value * value;
            peak = peak.max(value.abs());
            if sample.abs() > clip_level {
                clipped += 1;
            }
        }

        let n = samples.len() as f64;
        let mean = sum / n;
        let variance = (sum_sq / n - mean * mean).max(0.0);
        Self {
            samples: samples.len(),
            mean,
            variance,
            std_dev: variance.sqrt(),
            peak,
            clipped_fraction: clipped as f64 / n,
        }
    }
}

/// Variance below the silence threshold. Empty input counts as silent.
pub fn is_silent(samples: &[f32], thresholds: &HeuristicThresholds) -> bool {
    samples.is_empty()
        || SignalStats::compute(samples, thresholds.clip_level).variance
            < thresholds.silence_variance
}

/// More than the allowed fraction of samples sits at full scale.
pub fn is_clipped(samples: &[f32], thresholds: &HeuristicThresholds) -> bool {
    !samples.is_empty()
        && SignalStats::compute(samples, thresholds.clip_level).clipped_fraction
            > thresholds.clip_fraction
}

/// Standard deviation outside the plausible range. Empty input is anomalous.
pub fn has_scale_anomaly(samples: &[f32], thresholds: &HeuristicThresholds) -> bool {
    if samples.is_empty() {
        return true;
    }
    let std_dev = SignalStats::compute(samples, thresholds.clip_level).std_dev;
    std_dev < thresholds.scale_min_stddev || std_dev > thresholds.scale_max_stddev
}

/// All heuristic outcomes for one preview.
///
/// Every flag is always evaluated; [`FilterFlags`] only decide which of them
/// may hide a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    pub stats: SignalStats,
    pub silent: bool,
    pub clipped: bool,
    pub scale_anomaly: bool,
}

impl SignalReport {
    pub fn analyze(samples: &[f32], thresholds: &HeuristicThresholds) -> Self {
        let stats = SignalStats::compute(samples, thresholds.clip_level);
        let empty = samples.is_empty();
        Self {
            stats,
            silent: empty || stats.variance < thresholds.silence_variance,
            clipped: !empty && stats.clipped_fraction > thresholds.clip_fraction,
            scale_anomaly: empty
                || stats.std_dev < thresholds.scale_min_stddev
                || stats.std_dev > thresholds.scale_max_stddev,
        }
    }

    /// First enabled flag that fired, checked as silent, clipped, scale.
    pub fn hidden_reason(&self, filters: &FilterFlags) -> Option<HiddenReason> {
        if filters.silent && self.silent {
            Some(HiddenReason::Silent)
        } else if filters.clipped && self.clipped {
            Some(HiddenReason::Clipped)
        } else if filters.scale && self.scale_anomaly {
            Some(HiddenReason::ScaleAnomaly)
        } else {
            None
        }
    }
}
