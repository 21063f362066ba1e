//! Runtime fractional-position evaluation of a [`PolyphaseFilter`]
//!
//! The kernel is allocation free and performs a fixed amount of work per call,
//! so it is safe to run on the audio thread. Preconditions are only checked in
//! debug builds; violating them in release builds panics on a slice bound or
//! returns garbage, never anything worse.

use crate::constants::SIMD_LANES;
use crate::design::PolyphaseFilter;

/// Evaluate `filter` at `fractional_position` past `history[sample_index]`
///
/// The newest tap lands on `sample_index`, so `history` must hold at least
/// `taps_per_phase` samples ending there. The result approximates the input
/// signal at `sample_index - latency + fractional_position`.
///
/// `fractional_position` must be in `[0, 1)`. Positions that fall exactly on
/// a phase evaluate that phase alone; anything else blends linearly between
/// the two neighbouring phases.
#[inline]
pub fn resample(
    filter: &PolyphaseFilter,
    history: &[f32],
    sample_index: usize,
    fractional_position: f32,
) -> f32 {
    debug_assert!((0.0..1.0).contains(&fractional_position));
    let taps = filter.taps_per_phase();
    debug_assert!(sample_index + 1 >= taps);
    debug_assert!(sample_index < history.len());

    let upsampled_position = fractional_position * filter.upsample_factor() as f32;
    let phase_a = upsampled_position as usize; // Rounds toward zero
    let blend = upsampled_position - phase_a as f32;

    let samples = &history[sample_index + 1 - taps..=sample_index];
    let coefficients_a = filter.phase(phase_a);

    if blend == 0.0 {
        let mut result = [0.0f32; SIMD_LANES];
        for (c, s) in coefficients_a
            .chunks_exact(SIMD_LANES)
            .zip(samples.chunks_exact(SIMD_LANES))
        {
            for lane in 0..SIMD_LANES {
                result[lane] += c[lane] * s[lane];
            }
        }
        return result.iter().sum();
    }

    let coefficients_b = filter.phase(phase_a + 1);
    let mut result_a = [0.0f32; SIMD_LANES];
    let mut result_b = [0.0f32; SIMD_LANES];
    for ((a, b), s) in coefficients_a
        .chunks_exact(SIMD_LANES)
        .zip(coefficients_b.chunks_exact(SIMD_LANES))
        .zip(samples.chunks_exact(SIMD_LANES))
    {
        for lane in 0..SIMD_LANES {
            result_a[lane] += a[lane] * s[lane];
            result_b[lane] += b[lane] * s[lane];
        }
    }

    // Interpolation is linear, so blend per lane and sum once
    let mut result = 0.0;
    for lane in 0..SIMD_LANES {
        result += result_a[lane] + (result_b[lane] - result_a[lane]) * blend;
    }
    result
}

/// Borrowed view of a filter for use on the audio thread
#[derive(Debug, Clone, Copy)]
pub struct Resampler<'a> {
    filter: &'a PolyphaseFilter,
}

impl<'a> Resampler<'a> {
    pub fn new(filter: &'a PolyphaseFilter) -> Self {
        Self { filter }
    }

    /// See [`resample`]
    #[inline]
    pub fn resample(&self, history: &[f32], sample_index: usize, fractional_position: f32) -> f32 {
        resample(self.filter, history, sample_index, fractional_position)
    }

    /// Delay in input samples between a sample entering the history and the
    /// output that reproduces it
    pub fn latency(&self) -> usize {
        self.filter.latency()
    }

    pub fn taps_per_phase(&self) -> usize {
        self.filter.taps_per_phase()
    }

    /// Number of history samples each call reads, ending at `sample_index`
    pub fn required_history_samples(&self) -> usize {
        self.filter.taps_per_phase()
    }

    /// Upsample a whole buffer by an integer `factor` (offline use only)
    ///
    /// The input is padded with `taps_per_phase - 1 - latency` leading and
    /// `latency` trailing zeros so that output `n * factor + k` approximates
    /// `input(n + k / factor)` with no delay.
    pub fn upsample(&self, input: &[f32], factor: usize) -> Vec<f32> {
        let history_length = self.taps_per_phase() - 1;
        let leading = history_length.saturating_sub(self.latency());

        let mut padded = vec![0.0f32; leading];
        padded.extend_from_slice(input);
        padded.resize(padded.len() + self.latency(), 0.0);

        let fractions: Vec<f32> = (0..factor).map(|k| k as f32 / factor as f32).collect();
        let mut output = Vec::with_capacity(input.len() * factor);
        for n in 0..input.len() {
            for &fraction in &fractions {
                output.push(self.resample(&padded, n + leading + self.latency(), fraction));
            }
        }
        output
    }
}
