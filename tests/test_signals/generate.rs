use std::f64::consts::PI;

/// Unit sine at `frequency` cycles/sample, evaluated at a fractional time
pub fn sine_at(frequency: f64, t: f64) -> f64 {
    (2.0 * PI * frequency * t).sin()
}

/// `length` samples of a unit sine at `frequency` cycles/sample
pub fn sine(frequency: f64, length: usize) -> Vec<f32> {
    (0..length)
        .map(|i| sine_at(frequency, i as f64) as f32)
        .collect()
}

/// Unit impulse at `position` in an otherwise silent buffer
pub fn impulse(length: usize, position: usize) -> Vec<f32> {
    let mut samples = vec![0.0; length];
    samples[position] = 1.0;
    samples
}
