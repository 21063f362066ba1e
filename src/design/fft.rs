//! FFT and convolution helpers for filter synthesis

use num_complex::Complex64;
use rustfft::FftPlanner;

/// Forward transform of a real signal zero-padded (or truncated) to `length`
pub fn fft_padded(signal: &[f64], length: usize) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = signal
        .iter()
        .take(length)
        .map(|&x| Complex64::new(x, 0.0))
        .collect();
    buffer.resize(length, Complex64::new(0.0, 0.0));

    let mut planner = FftPlanner::new();
    planner.plan_fft_forward(length).process(&mut buffer);
    buffer
}

/// Inverse transform with 1/N scaling, in place
pub fn ifft_normalized(spectrum: &mut [Complex64]) {
    let length = spectrum.len();
    let mut planner = FftPlanner::new();
    planner.plan_fft_inverse(length).process(spectrum);

    let scale = 1.0 / length as f64;
    for c in spectrum.iter_mut() {
        *c *= scale;
    }
}

/// Full linear convolution, output length `a.len() + b.len() - 1`
pub fn convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }

    let mut output = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            output[i + j] += x * y;
        }
    }
    output
}

/// Rotate so the zero-lag sample lands at the midpoint
pub fn fft_shift<T: Copy>(buffer: &mut [T]) {
    let half = buffer.len() / 2;
    buffer.rotate_right(half);
}
