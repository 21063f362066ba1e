use crate::design::fft::convolve;

/// Length of the box filter placing a notch at `notch_frequency`
///
/// The frequency is normalized to the upsampled rate before rounding, so a
/// notch at `f` (original-rate cycles/sample) needs `round(upsample_factor / f)`
/// taps.
pub fn notch_filter_length(notch_frequency: f64, upsample_factor: usize) -> usize {
    let upsampled_frequency = notch_frequency / upsample_factor as f64;
    (1.0 / upsampled_frequency).round() as usize
}

/// Build a cascade of comb notch filters
///
/// Each notch is an FIR of N equal taps `1/N` (unit DC gain), which places N
/// evenly spaced nulls across the spectrum. The per-notch filters are
/// convolved in order starting from a unit impulse, so an empty list yields
/// the identity filter `[1.0]`.
pub fn build_notch_cascade(notch_frequencies: &[f64], upsample_factor: usize) -> Vec<f64> {
    let mut cascade = vec![1.0];
    for &notch_frequency in notch_frequencies {
        let length = notch_filter_length(notch_frequency, upsample_factor);
        let notch_filter = vec![1.0 / length as f64; length];
        cascade = convolve(&cascade, &notch_filter);
        log::debug!(
            "Notch at {} -> {} taps (cascade length {})",
            notch_frequency,
            length,
            cascade.len()
        );
    }
    cascade
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::design::fft::fft_padded;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_cascade_is_identity() {
        assert_eq!(build_notch_cascade(&[], 16), vec![1.0]);
    }

    #[test]
    fn test_single_notch_box_filter() {
        // 0.5 at 4x upsampling -> normalized 0.125 -> 8 taps of 1/8
        let cascade = build_notch_cascade(&[0.5], 4);
        assert_eq!(cascade.len(), 8);
        for tap in cascade {
            assert_relative_eq!(tap, 0.125, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_cascade_length() {
        // Two 32-tap boxes convolve to 63 taps
        let cascade = build_notch_cascade(&[0.5, 0.5], 16);
        assert_eq!(cascade.len(), 63);
    }

    #[test]
    fn test_cascade_unit_dc_gain() {
        let cascade = build_notch_cascade(&[0.5, 0.3, 0.7], 8);
        let dc: f64 = cascade.iter().sum();
        assert_relative_eq!(dc, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_notch_nulls() {
        // 9-tap box has nulls at k/9 of the (upsampled) sample rate
        let cascade = build_notch_cascade(&[16.0 / 9.0], 16);
        assert_eq!(cascade.len(), 9);
        let spectrum = fft_padded(&cascade, 9 * 64);
        for k in 1..=4 {
            assert!(
                spectrum[k * 64].norm() < 1e-12,
                "Expected null at bin {}",
                k * 64
            );
        }
    }

    #[test]
    fn test_notch_length_rounding() {
        assert_eq!(notch_filter_length(0.3, 1), 3);
        assert_eq!(notch_filter_length(0.45, 4), 9);
    }
}
