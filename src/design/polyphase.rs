//! Polyphase decomposition
//!
//! Upsampling by U inserts U - 1 zeros after every input sample, so when the
//! composite filter runs over the zero-stuffed signal only every U-th
//! coefficient ever meets a real sample. Which subset survives depends on the
//! output position within the input interval; each subset is a phase.
//!
//! With U = 4 and 4 taps per phase (`S` is the zero-stuffed history, digits are
//! input sample ages, `x` is the padded zero):
//!
//! ```text
//! S   ...3...2...1...0...
//!        |   |   |   |
//! 0 432109876543210x        1   7   3   x
//! 1  432109876543210x       2   8   4   0
//! 2   432109876543210x      3   9   5   1
//! 3    432109876543210x     4   0   6   2
//! 4     432109876543210x        1   7   3   x
//! ```
//!
//! Every phase is shifted back by one coefficient, which moves the padded zero
//! to the oldest tap. Blending between phase U - 1 and phase 0 of the next
//! input sample then becomes blending with an extra phase U over the same
//! history window, at the cost of one upsampled sample of latency.

use crate::config::FilterParams;
use crate::constants::SIMD_LANES;
use crate::design::lowpass::synthesize;
use crate::error::{ResamplerError, Result};
use serde::{Deserialize, Serialize};

/// Polyphase FIR ready for runtime evaluation
///
/// Holds `upsample_factor + 1` phases of `taps_per_phase` coefficients each in
/// one contiguous buffer (`phase * taps_per_phase + tap`). Coefficients are
/// stored tap-reversed so they multiply a forward-ordered history directly.
/// Immutable once built; share it freely between channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    into = "crate::filter_file::FilterFile",
    try_from = "crate::filter_file::FilterFile"
)]
pub struct PolyphaseFilter {
    upsample_factor: usize,
    taps_per_phase: usize,
    latency: usize,
    coefficients: Vec<f32>,
}

impl PolyphaseFilter {
    /// Assemble a filter from a flat phase buffer
    ///
    /// # Errors
    /// Returns `ResamplerError::InvalidFilterGeometry` if `upsample_factor` is
    /// not a power of two, `taps_per_phase` is not a positive multiple of the
    /// SIMD lane count, or the buffer does not hold exactly
    /// `upsample_factor + 1` phases of `taps_per_phase` taps.
    pub fn from_parts(
        upsample_factor: usize,
        taps_per_phase: usize,
        latency: usize,
        coefficients: Vec<f32>,
    ) -> Result<Self> {
        if !upsample_factor.is_power_of_two()
            || taps_per_phase == 0
            || !taps_per_phase.is_multiple_of(SIMD_LANES)
        {
            return Err(ResamplerError::InvalidFilterGeometry(format!(
                "unsupported filter geometry ({} phases x {} taps)",
                upsample_factor, taps_per_phase
            )));
        }

        let expected = (upsample_factor + 1) * taps_per_phase;
        if coefficients.len() != expected {
            return Err(ResamplerError::InvalidFilterGeometry(format!(
                "expected {} coefficients for {} phases of {} taps, got {}",
                expected,
                upsample_factor + 1,
                taps_per_phase,
                coefficients.len()
            )));
        }

        Ok(Self {
            upsample_factor,
            taps_per_phase,
            latency,
            coefficients,
        })
    }

    pub fn upsample_factor(&self) -> usize {
        self.upsample_factor
    }

    pub fn taps_per_phase(&self) -> usize {
        self.taps_per_phase
    }

    /// Group delay in original-rate samples
    pub fn latency(&self) -> usize {
        self.latency
    }

    /// Number of stored phases (`upsample_factor + 1`)
    pub fn phase_count(&self) -> usize {
        self.upsample_factor + 1
    }

    /// Coefficients of one phase, tap-reversed
    pub fn phase(&self, index: usize) -> &[f32] {
        let start = index * self.taps_per_phase;
        &self.coefficients[start..start + self.taps_per_phase]
    }

    pub fn phases(&self) -> impl Iterator<Item = &[f32]> {
        self.coefficients.chunks_exact(self.taps_per_phase)
    }

    /// Reassemble the composite (gain-scaled) filter from phases `0..upsample_factor`
    pub fn coefficients(&self) -> Vec<f64> {
        let u = self.upsample_factor;
        let t = self.taps_per_phase;
        let mut coefficients = vec![0.0; u * t - 1];
        for p in 0..u {
            let phase = self.phase(p);
            for (tap, &c) in phase.iter().enumerate() {
                if let Some(index) = ((t - tap - 1) * u + p).checked_sub(1) {
                    coefficients[index] = c as f64;
                }
            }
        }
        coefficients
    }
}

/// Split a composite filter into phases and compute its latency
///
/// # Errors
/// Returns `ResamplerError::InvalidFilterGeometry` if `coefficients` does not
/// have `filter_order + 1` taps or the latency is not a whole number of
/// original-rate samples.
pub fn decompose(coefficients: &[f64], params: &FilterParams) -> Result<PolyphaseFilter> {
    let u = params.upsample_factor;
    let t = params.taps_per_phase;
    if u * t < 2 || coefficients.len() != params.coefficient_count() {
        return Err(ResamplerError::InvalidFilterGeometry(format!(
            "expected {} coefficients, got {}",
            (u * t).saturating_sub(1),
            coefficients.len()
        )));
    }

    let mut phases = Vec::with_capacity((u + 1) * t);
    for p in 0..u {
        for tap in 0..t {
            // Only phase 0's oldest tap falls before the first coefficient
            let coefficient = ((t - tap - 1) * u + p)
                .checked_sub(1)
                .map_or(0.0, |index| coefficients[index]);
            phases.push(coefficient as f32);
        }
    }

    // Extra phase: phase 0 shifted one tap toward the newest sample
    phases.push(0.0);
    phases.extend_from_within(0..t - 1);

    let upsampled_latency = params.filter_order() / 2 + 1;
    if !upsampled_latency.is_multiple_of(u) {
        return Err(ResamplerError::InvalidFilterGeometry(format!(
            "upsampled latency {} is not a multiple of upsample factor {}",
            upsampled_latency, u
        )));
    }

    PolyphaseFilter::from_parts(u, t, upsampled_latency / u, phases)
}

/// Validate, synthesize and decompose in one step
pub fn design_polyphase_filter(params: &FilterParams) -> Result<PolyphaseFilter> {
    let coefficients = synthesize(params)?;
    let filter = decompose(&coefficients, params)?;
    log::info!(
        "Designed {}x{} polyphase filter ({} window, cutoff {}), latency {} samples",
        params.upsample_factor,
        params.taps_per_phase,
        params.window_type,
        params.cutoff_frequency,
        filter.latency()
    );
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowType;

    fn ramp_params() -> FilterParams {
        FilterParams::new(4, 8, 0.4, WindowType::Hann)
    }

    fn ramp(params: &FilterParams) -> Vec<f64> {
        (0..params.coefficient_count()).map(|i| i as f64 + 1.0).collect()
    }

    #[test]
    fn test_decompose_shape() {
        let params = ramp_params();
        let filter = decompose(&ramp(&params), &params).unwrap();
        assert_eq!(filter.phase_count(), 5);
        assert_eq!(filter.phases().count(), 5);
        for phase in filter.phases() {
            assert_eq!(phase.len(), 8);
        }
    }

    #[test]
    fn test_decompose_indexing() {
        // Ramp coefficient i has value i + 1, so each tap reveals its index
        let params = ramp_params();
        let filter = decompose(&ramp(&params), &params).unwrap();

        // Phase 0 newest tap is the padded zero, then every 4th coefficient
        // counting back from index 3
        assert_eq!(filter.phase(0)[7], 0.0);
        assert_eq!(filter.phase(0)[6], 4.0);
        assert_eq!(filter.phase(0)[0], 28.0);

        // Phase 1 starts at coefficient 0
        assert_eq!(filter.phase(1)[7], 1.0);
        assert_eq!(filter.phase(1)[6], 5.0);

        // Phase 3 newest tap is coefficient 2
        assert_eq!(filter.phase(3)[7], 3.0);
        assert_eq!(filter.phase(3)[0], 31.0);
    }

    #[test]
    fn test_extra_phase_is_shifted_phase_zero() {
        let params = ramp_params();
        let filter = decompose(&ramp(&params), &params).unwrap();
        let extra = filter.phase(4);
        assert_eq!(extra[0], 0.0);
        assert_eq!(&extra[1..], &filter.phase(0)[..7]);
    }

    #[test]
    fn test_decompose_latency() {
        let params = ramp_params();
        let filter = decompose(&ramp(&params), &params).unwrap();
        // order 30 -> upsampled latency 16 -> 4 samples
        assert_eq!(filter.latency(), 4);
    }

    #[test]
    fn test_decompose_wrong_length() {
        let params = ramp_params();
        let err = decompose(&[1.0; 30], &params).unwrap_err();
        assert!(matches!(err, ResamplerError::InvalidFilterGeometry(_)));
    }

    #[test]
    fn test_coefficients_reassembled() {
        let params = ramp_params();
        let coefficients = ramp(&params);
        let filter = decompose(&coefficients, &params).unwrap();
        assert_eq!(filter.coefficients(), coefficients);
    }

    #[test]
    fn test_from_parts_rejects_bad_shape() {
        assert!(PolyphaseFilter::from_parts(4, 8, 4, vec![0.0; 39]).is_err());
        assert!(PolyphaseFilter::from_parts(0, 8, 0, vec![]).is_err());
        assert!(PolyphaseFilter::from_parts(1, 4, 0, vec![0.0; 8]).is_err());
        assert!(PolyphaseFilter::from_parts(3, 8, 4, vec![0.0; 32]).is_err());
        assert!(PolyphaseFilter::from_parts(4, 8, 4, vec![0.0; 40]).is_ok());
    }

    #[test]
    fn test_design_polyphase_filter() {
        let filter = design_polyphase_filter(&ramp_params()).unwrap();
        assert_eq!(filter.upsample_factor(), 4);
        assert_eq!(filter.taps_per_phase(), 8);
        assert_eq!(filter.latency(), 4);
    }
}
