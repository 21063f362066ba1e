//! Read-only diagnostics for synthesized filters
//!
//! Frequencies are in original-rate cycles/sample (0.5 is the original
//! Nyquist). Magnitudes are normalized by the upsample factor so a unity
//! passband reads 0 dB.

use crate::constants::{DB_FLOOR_MAGNITUDE, TRANSITION_BAND_THRESHOLD_DB};
use crate::design::PolyphaseFilter;
use crate::design::fft::fft_padded;
use crate::resampler::resample;
use num_complex::Complex64;
use serde::Serialize;
use std::f64::consts::PI;

/// Transform oversampling used for response plots and measurements
pub const RESPONSE_OVERSAMPLE: usize = 16;

/// Convert a linear magnitude to dB, clamped at -200 dB
pub fn db(magnitude: f64) -> f64 {
    20.0 * magnitude.max(DB_FLOOR_MAGNITUDE).log10()
}

/// Sampled frequency response from DC to the upsampled Nyquist, inclusive
///
/// Uses a zero-padded transform of `next_power_of_two(len) * oversample`
/// points (an `oversample` of 0 is treated as 1). Returns `(frequency,
/// response)` pairs.
pub fn frequency_response(
    coefficients: &[f64],
    oversample: usize,
    upsample_factor: usize,
) -> Vec<(f64, Complex64)> {
    let length = coefficients.len().next_power_of_two() * oversample.max(1);
    let spectrum = fft_padded(coefficients, length);
    let half = length / 2;
    let nyquist = upsample_factor as f64 * 0.5;

    spectrum[..=half]
        .iter()
        .enumerate()
        .map(|(i, &h)| (nyquist * i as f64 / half as f64, h))
        .collect()
}

/// Magnitude response at a single frequency, evaluated directly
pub fn magnitude_at(coefficients: &[f64], frequency: f64, upsample_factor: usize) -> f64 {
    let omega = 2.0 * PI * frequency / upsample_factor as f64;
    let sum: Complex64 = coefficients
        .iter()
        .enumerate()
        .map(|(n, &c)| Complex64::from_polar(c, -omega * n as f64))
        .sum();
    sum.norm()
}

/// Passband and stopband measurements
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponseAnalysis {
    /// First frequency where the response drops below -1 dB
    pub transition_start: Option<f64>,
    /// Distance from `transition_start` to the nominal cutoff
    pub transition_bandwidth: Option<f64>,
    /// Largest passband deviation from unity gain, in dB
    pub max_ripple_db: f64,
    /// Loudest response above the nominal cutoff, in dB
    pub stopband_attenuation_db: f64,
}

/// Measure ripple, transition start and stopband attenuation
///
/// Ripple is taken over the passband up to its last local rise before the
/// -1 dB point, so the roll-off into the transition band isn't counted.
pub fn analyze_response(
    coefficients: &[f64],
    cutoff_frequency: f64,
    upsample_factor: usize,
) -> ResponseAnalysis {
    let gain = upsample_factor as f64;
    let response = frequency_response(coefficients, RESPONSE_OVERSAMPLE, upsample_factor);

    let mut transition_start = None;
    let mut stopband = 0.0f64;
    let mut ripple_min = 1.0f64;
    let mut ripple_max = 1.0f64;
    let mut running_min = 1.0f64;
    let mut running_max = 1.0f64;
    let mut previous = f64::NEG_INFINITY;

    for (frequency, h) in response {
        let magnitude = h.norm() / gain;

        if transition_start.is_none() && db(magnitude) < TRANSITION_BAND_THRESHOLD_DB {
            transition_start = Some(frequency);
        }

        if transition_start.is_none() {
            running_min = running_min.min(magnitude);
            running_max = running_max.max(magnitude);
            if magnitude > previous {
                ripple_min = running_min;
                ripple_max = running_max;
            }
            previous = magnitude;
        }

        if frequency > cutoff_frequency {
            stopband = stopband.max(magnitude);
        }
    }

    ResponseAnalysis {
        transition_start,
        transition_bandwidth: transition_start.map(|start| cutoff_frequency - start),
        max_ripple_db: (-db(ripple_min)).max(db(ripple_max)),
        stopband_attenuation_db: db(stopband),
    }
}

/// Response analysis of a loaded filter
pub fn analyze_filter(filter: &PolyphaseFilter, cutoff_frequency: f64) -> ResponseAnalysis {
    analyze_response(
        &filter.coefficients(),
        cutoff_frequency,
        filter.upsample_factor(),
    )
}

/// RMS error of resampling a unit sine at `sub_positions` points per sample
///
/// `frequency` is in original-rate cycles/sample. Every output is compared
/// against the analytic sine at its delay-compensated position.
pub fn sine_rms_error(
    filter: &PolyphaseFilter,
    frequency: f64,
    sample_count: usize,
    sub_positions: usize,
) -> f64 {
    let taps = filter.taps_per_phase();
    let latency = filter.latency() as f64;
    let signal = |t: f64| (2.0 * PI * frequency * t).sin();
    let history: Vec<f32> = (0..sample_count + taps)
        .map(|i| signal(i as f64) as f32)
        .collect();

    let mut sum_squared = 0.0;
    let mut count = 0usize;
    for sample_index in taps - 1..history.len() {
        for k in 0..sub_positions {
            let fraction = k as f64 / sub_positions as f64;
            let output = resample(filter, &history, sample_index, fraction as f32) as f64;
            let expected = signal(sample_index as f64 - latency + fraction);
            sum_squared += (output - expected).powi(2);
            count += 1;
        }
    }

    (sum_squared / count.max(1) as f64).sqrt()
}
