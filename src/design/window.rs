use crate::config::WindowType;
use crate::constants::{WINDOW_ANALYSIS_MIN_POINTS, WINDOW_ANALYSIS_OVERSAMPLE};
use crate::design::fft::fft_padded;
use std::f64::consts::PI;

/// Spectral characteristics of a window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowAnalysis {
    /// Full width of the main lobe in radians per sample (twice the first null)
    pub main_lobe_width: f64,
    /// Largest side lobe magnitude relative to the main lobe peak (linear)
    pub side_lobe_ratio: f64,
}

/// Build a symmetric window of `length` samples
///
/// All windows use their symmetric (filter design) form, so an odd-length
/// window peaks at exactly 1.0 on its center sample. `kaiser_beta` is only
/// read for `WindowType::Kaiser`.
pub fn build_window(length: usize, window_type: WindowType, kaiser_beta: f64) -> Vec<f64> {
    if length == 0 {
        return Vec::new();
    }
    if length == 1 {
        return vec![1.0];
    }

    let m = (length - 1) as f64;
    match window_type {
        WindowType::Rectangular => vec![1.0; length],
        WindowType::Hann => (0..length)
            .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f64 / m).cos())
            .collect(),
        WindowType::Hamming => (0..length)
            .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / m).cos())
            .collect(),
        WindowType::Blackman => (0..length)
            .map(|n| {
                let x = 2.0 * PI * n as f64 / m;
                0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
            })
            .collect(),
        WindowType::Kaiser => kaiser_window(length, kaiser_beta),
    }
}

fn kaiser_window(length: usize, beta: f64) -> Vec<f64> {
    let half = (length - 1) as f64 / 2.0;
    let i0_beta = bessel_i0(beta);
    (0..length)
        .map(|n| {
            let x = (n as f64 - half) / half;
            bessel_i0(beta * (1.0 - x * x).max(0.0).sqrt()) / i0_beta
        })
        .collect()
}

/// Zeroth-order modified Bessel function of the first kind, I0(x).
fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    let half_x = x / 2.0;
    for k in 1..=500 {
        let ratio = half_x / k as f64;
        term *= ratio * ratio;
        sum += term;
        if term < 1e-17 * sum {
            break;
        }
    }
    sum
}

/// Measure main lobe width and side lobe level of a window
///
/// The response is sampled at `analysis_length` points over `[0, π)`, where
/// `analysis_length` is the window length (at least 65536) times 4 rounded up
/// to a power of two. The main lobe ends at the first point where the
/// magnitude starts rising again.
pub fn analyze_window(window: &[f64]) -> WindowAnalysis {
    let analysis_length = (window.len().max(WINDOW_ANALYSIS_MIN_POINTS)
        * WINDOW_ANALYSIS_OVERSAMPLE)
        .next_power_of_two();

    // A 2N-point transform evaluated on its first N bins covers [0, π)
    let spectrum = fft_padded(window, analysis_length * 2);
    let magnitudes: Vec<f64> = spectrum[..analysis_length]
        .iter()
        .map(|c| c.norm())
        .collect();
    let frequency = |i: usize| PI * i as f64 / analysis_length as f64;

    let main_lobe_magnitude = magnitudes.iter().cloned().fold(0.0, f64::max);

    let mut side_lobe_start = 0;
    let mut previous = magnitudes[0];
    for (i, &magnitude) in magnitudes.iter().enumerate() {
        if magnitude > previous {
            side_lobe_start = i;
            break;
        }
        previous = magnitude;
    }

    // No rise at all means the main lobe covers the whole band
    let null_index = side_lobe_start.checked_sub(1).unwrap_or(analysis_length - 1);
    let main_lobe_width = 2.0 * frequency(null_index);

    let side_lobe_magnitude = magnitudes[side_lobe_start..]
        .iter()
        .cloned()
        .fold(0.0, f64::max);

    let side_lobe_ratio = if main_lobe_magnitude > 0.0 {
        side_lobe_magnitude / main_lobe_magnitude
    } else {
        0.0
    };

    WindowAnalysis {
        main_lobe_width,
        side_lobe_ratio,
    }
}
