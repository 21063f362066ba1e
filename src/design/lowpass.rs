//! Windowed, notch-compensated lowpass synthesis
//!
//! The ideal lowpass response is built directly in the frequency domain over
//! a heavily oversampled grid, divided by the notch cascade's magnitude so the
//! later convolution with the cascade leaves a flat passband, then brought to
//! the time domain, truncated, windowed and finally convolved with the
//! cascade. The cutoff is pulled in by half of the window's main lobe so the
//! transition band ends near the requested frequency rather than straddling
//! it.

use crate::config::FilterParams;
use crate::constants::{IDEAL_FILTER_FFT_FACTOR, SYMMETRY_EPSILON};
use crate::design::fft::{convolve, fft_padded, fft_shift, ifft_normalized};
use crate::design::notch::build_notch_cascade;
use crate::design::window::{WindowAnalysis, analyze_window, build_window};
use crate::error::{ResamplerError, Result};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Side lobes louder than this (linear, relative to the main lobe) get a warning
const WEAK_WINDOW_SIDE_LOBE_RATIO: f64 = 0.1;

/// Cascade magnitudes below this inside the passband cannot be compensated
const MIN_NOTCH_PASSBAND_MAGNITUDE: f64 = 1e-12;

/// Order of the filter before convolution with a notch cascade of `cascade_length`
///
/// # Errors
/// Returns `ResamplerError::InvalidFilterGeometry` if the cascade is longer
/// than the filter or leaves an odd order (even coefficient count).
pub fn pre_notch_order(params: &FilterParams, cascade_length: usize) -> Result<usize> {
    let filter_order = params.filter_order();
    let pre_order = (filter_order + 1).checked_sub(cascade_length).ok_or_else(|| {
        ResamplerError::InvalidFilterGeometry(format!(
            "notch cascade of {} taps exceeds filter length {}",
            cascade_length,
            filter_order + 1
        ))
    })?;

    if !pre_order.is_multiple_of(2) {
        return Err(ResamplerError::InvalidFilterGeometry(format!(
            "notch cascade of {} taps leaves odd pre-notch order {}",
            cascade_length, pre_order
        )));
    }
    Ok(pre_order)
}

/// Cutoff after compensating for the window's transition bandwidth,
/// in original-rate cycles/sample
pub fn compensated_cutoff(params: &FilterParams, analysis: &WindowAnalysis) -> f64 {
    let transition_bandwidth =
        analysis.main_lobe_width * params.upsample_factor as f64 / (2.0 * PI);
    params.cutoff_frequency - 0.5 * transition_bandwidth
}

/// Build the centered, unwindowed ideal lowpass of `pre_order + 1` taps
///
/// `cutoff` is in original-rate cycles/sample. The passband is pre-divided by
/// the magnitude response of `notch_cascade`.
///
/// # Errors
/// - `InvalidFilterGeometry` if the cutoff maps to an empty passband or the
///   cascade has a null inside the passband
/// - `NumericInstability` if the inverse transform is not real or the result
///   is not symmetric
pub fn ideal_lowpass(
    params: &FilterParams,
    notch_cascade: &[f64],
    pre_order: usize,
    cutoff: f64,
) -> Result<Vec<f64>> {
    let fft_length = params.upsample_factor * params.taps_per_phase * IDEAL_FILTER_FFT_FACTOR;
    let upsampled_cutoff = cutoff / params.upsample_factor as f64;
    let cutoff_index = (upsampled_cutoff * fft_length as f64).round();

    if cutoff_index.is_nan() || cutoff_index < 1.0 {
        return Err(ResamplerError::InvalidFilterGeometry(format!(
            "compensated cutoff {:.6} leaves an empty passband",
            cutoff
        )));
    }
    let cutoff_index = (cutoff_index as usize).min(fft_length / 2);

    let notch_spectrum = fft_padded(notch_cascade, fft_length);
    let mut spectrum = vec![Complex64::new(0.0, 0.0); fft_length];
    for (bin, notch) in spectrum.iter_mut().zip(&notch_spectrum).take(cutoff_index) {
        let magnitude = notch.norm();
        if magnitude < MIN_NOTCH_PASSBAND_MAGNITUDE {
            return Err(ResamplerError::InvalidFilterGeometry(
                "notch cascade has a null inside the passband".to_string(),
            ));
        }
        *bin = Complex64::new(1.0 / magnitude, 0.0);
    }

    // Mirror and conjugate so the inverse transform is real
    for i in 1..fft_length / 2 {
        spectrum[fft_length - i] = spectrum[i].conj();
    }

    ifft_normalized(&mut spectrum);

    let max_imaginary = spectrum.iter().map(|c| c.im.abs()).fold(0.0, f64::max);
    if max_imaginary > SYMMETRY_EPSILON {
        return Err(ResamplerError::NumericInstability(format!(
            "ideal filter has imaginary residue {:e}",
            max_imaginary
        )));
    }

    let mut impulse_response: Vec<f64> = spectrum.iter().map(|c| c.re).collect();
    fft_shift(&mut impulse_response);

    let start = fft_length / 2 - pre_order / 2;
    let coefficients = impulse_response[start..start + pre_order + 1].to_vec();
    check_symmetric(&coefficients, "ideal filter")?;

    Ok(coefficients)
}

/// Synthesize the composite lowpass filter
///
/// Returns `upsample_factor * taps_per_phase - 1` coefficients, already scaled
/// by `upsample_factor` to make up for the gain lost to zero stuffing.
///
/// # Errors
/// Parameter validation and geometry failures return `InvalidFilterGeometry`;
/// failed internal consistency checks return `NumericInstability`.
pub fn synthesize(params: &FilterParams) -> Result<Vec<f64>> {
    params.validate()?;

    let notch_cascade = build_notch_cascade(&params.notch_frequencies, params.upsample_factor);
    let pre_order = pre_notch_order(params, notch_cascade.len())?;

    let window = build_window(pre_order + 1, params.window_type, params.kaiser_beta);
    if (window[pre_order / 2] - 1.0).abs() > SYMMETRY_EPSILON {
        return Err(ResamplerError::NumericInstability(format!(
            "{} window is not centered (center value {})",
            params.window_type,
            window[pre_order / 2]
        )));
    }
    check_symmetric(&window, "window")?;

    // TODO: measured side lobes undershoot the attenuation seen after windowing.
    // Try compensating by less than the full main lobe width once that is understood.
    let analysis = analyze_window(&window);
    if analysis.side_lobe_ratio > WEAK_WINDOW_SIDE_LOBE_RATIO {
        log::warn!(
            "{} window side lobes at {:.1} dB limit stopband attenuation",
            params.window_type,
            20.0 * analysis.side_lobe_ratio.log10()
        );
    }

    let cutoff = compensated_cutoff(params, &analysis);
    log::debug!(
        "Window {} ({} taps): main lobe {:.3e} rad, side lobes {:.1} dB, cutoff {} -> {:.6}",
        params.window_type,
        window.len(),
        analysis.main_lobe_width,
        20.0 * analysis.side_lobe_ratio.max(1e-300).log10(),
        params.cutoff_frequency,
        cutoff
    );

    let mut coefficients = ideal_lowpass(params, &notch_cascade, pre_order, cutoff)?;
    for (c, w) in coefficients.iter_mut().zip(&window) {
        *c *= w;
    }

    let mut coefficients = convolve(&coefficients, &notch_cascade);
    debug_assert_eq!(coefficients.len(), params.coefficient_count());

    let gain = params.upsample_factor as f64;
    for c in coefficients.iter_mut() {
        *c *= gain;
    }

    Ok(coefficients)
}

fn check_symmetric(values: &[f64], what: &str) -> Result<()> {
    let n = values.len();
    for i in 0..n / 2 {
        let deviation = (values[i] - values[n - 1 - i]).abs();
        if deviation > SYMMETRY_EPSILON {
            return Err(ResamplerError::NumericInstability(format!(
                "{} is not symmetric at tap {} (deviation {:e})",
                what, i, deviation
            )));
        }
    }
    Ok(())
}
