//! Numeric constants for filter synthesis
//!
//! Tolerances and sizing factors shared by the design pipeline and the
//! diagnostics.

/// SIMD lane count the runtime kernel is laid out for.
/// Taps per phase must be a multiple of this.
pub const SIMD_LANES: usize = 8;

/// Tolerance for symmetry, centering and inverse-transform residue checks.
pub const SYMMETRY_EPSILON: f64 = 1e-7;

/// Oversampling of the frequency-domain ideal filter construction relative
/// to the full (upsampled) filter length.
pub const IDEAL_FILTER_FFT_FACTOR: usize = 32;

/// Minimum number of points used when analyzing a window's spectrum.
pub const WINDOW_ANALYSIS_MIN_POINTS: usize = 65536;

/// Oversampling applied on top of `WINDOW_ANALYSIS_MIN_POINTS`.
pub const WINDOW_ANALYSIS_OVERSAMPLE: usize = 4;

/// Magnitude floor for dB conversion so silence doesn't produce -inf.
pub const DB_FLOOR_MAGNITUDE: f64 = 1e-10;

/// Magnitude (dB) below which the passband is considered to have ended.
pub const TRANSITION_BAND_THRESHOLD_DB: f64 = -1.0;
