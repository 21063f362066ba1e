//! Filter design configuration.
//!
//! A [`FilterParams`] value is supplied once (from code, CLI flags or a TOML
//! file), validated, and passed by reference into synthesis. There is no
//! global design state.
//!
//! ## TOML format
//!
//! ```toml
//! [filter]
//! upsample_factor = 512
//! taps_per_phase = 256
//! cutoff_frequency = 0.5
//! window_type = "kaiser"
//! kaiser_beta = 15.0
//! notch_frequencies = []
//! ```

use crate::constants::SIMD_LANES;
use crate::error::{ResamplerError, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Tapering window applied to the truncated ideal filter
///
/// # Parsing
/// Names are case insensitive: `rectangular`, `hann`, `hamming`, `blackman`,
/// `kaiser`. Anything else is an `UnsupportedWindowType` error.
///
/// ```
/// use polyphase::config::WindowType;
///
/// let window: WindowType = "Kaiser".parse().unwrap();
/// assert_eq!(window, WindowType::Kaiser);
/// assert!("triangle".parse::<WindowType>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    /// All ones (no tapering)
    Rectangular,
    /// Raised cosine
    Hann,
    /// Raised cosine on a pedestal
    Hamming,
    /// Three-term cosine sum
    Blackman,
    /// Bessel-based window, shape controlled by `kaiser_beta`
    Kaiser,
}

impl fmt::Display for WindowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WindowType::Rectangular => "rectangular",
            WindowType::Hann => "hann",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
            WindowType::Kaiser => "kaiser",
        };
        f.write_str(name)
    }
}

impl FromStr for WindowType {
    type Err = ResamplerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rectangular" | "rect" => Ok(WindowType::Rectangular),
            "hann" | "hanning" => Ok(WindowType::Hann),
            "hamming" => Ok(WindowType::Hamming),
            "blackman" => Ok(WindowType::Blackman),
            "kaiser" => Ok(WindowType::Kaiser),
            _ => Err(ResamplerError::UnsupportedWindowType(s.to_string())),
        }
    }
}

/// Polyphase filter design parameters
///
/// Frequencies are in cycles per sample of the original (non-upsampled) rate,
/// so 0.5 is the original Nyquist frequency and `upsample_factor / 2` is the
/// Nyquist frequency of the upsampled signal.
///
/// # Example
/// ```
/// use polyphase::config::{FilterParams, WindowType};
///
/// let params = FilterParams::new(4, 8, 0.4, WindowType::Hann);
/// assert!(params.validate().is_ok());
/// assert_eq!(params.filter_order(), 30);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FilterParams {
    /// Number of phases; must be a power of two
    pub upsample_factor: usize,
    /// Taps evaluated per phase; must be a multiple of the SIMD lane count
    pub taps_per_phase: usize,
    /// Passband edge before transition-band compensation
    pub cutoff_frequency: f64,
    /// Window applied to the truncated ideal filter
    pub window_type: WindowType,
    /// Kaiser shape parameter (ignored for other windows)
    pub kaiser_beta: f64,
    /// Comb notch frequencies, convolved in order
    pub notch_frequencies: Vec<f64>,
}

impl FilterParams {
    /// Create parameters without notches and with a zero Kaiser beta
    pub fn new(
        upsample_factor: usize,
        taps_per_phase: usize,
        cutoff_frequency: f64,
        window_type: WindowType,
    ) -> Self {
        Self {
            upsample_factor,
            taps_per_phase,
            cutoff_frequency,
            window_type,
            kaiser_beta: 0.0,
            notch_frequencies: Vec::new(),
        }
    }

    pub fn with_kaiser_beta(mut self, beta: f64) -> Self {
        self.kaiser_beta = beta;
        self
    }

    pub fn with_notch_frequencies(mut self, notch_frequencies: Vec<f64>) -> Self {
        self.notch_frequencies = notch_frequencies;
        self
    }

    /// Order of the composite filter.
    ///
    /// One tap short of `upsample_factor * taps_per_phase` so the coefficient
    /// count is odd and the group delay is an integer.
    pub fn filter_order(&self) -> usize {
        self.upsample_factor * self.taps_per_phase - 2
    }

    /// Number of coefficients in the composite filter (`filter_order + 1`)
    pub fn coefficient_count(&self) -> usize {
        self.filter_order() + 1
    }

    /// Check the parameter constraints required before synthesis
    ///
    /// # Errors
    /// Returns `ResamplerError::InvalidFilterGeometry` describing the first
    /// violated constraint.
    pub fn validate(&self) -> Result<()> {
        if !self.upsample_factor.is_power_of_two() {
            return Err(ResamplerError::InvalidFilterGeometry(format!(
                "upsample factor {} is not a power of two",
                self.upsample_factor
            )));
        }

        if self.taps_per_phase == 0 || !self.taps_per_phase.is_multiple_of(SIMD_LANES) {
            return Err(ResamplerError::InvalidFilterGeometry(format!(
                "taps per phase {} is not a positive multiple of {}",
                self.taps_per_phase, SIMD_LANES
            )));
        }

        let nyquist = self.upsample_factor as f64 * 0.5;
        if !self.cutoff_frequency.is_finite()
            || self.cutoff_frequency <= 0.0
            || self.cutoff_frequency >= nyquist
        {
            return Err(ResamplerError::InvalidFilterGeometry(format!(
                "cutoff frequency {} outside (0, {})",
                self.cutoff_frequency, nyquist
            )));
        }

        if self.window_type == WindowType::Kaiser
            && (!self.kaiser_beta.is_finite() || self.kaiser_beta < 0.0)
        {
            return Err(ResamplerError::InvalidFilterGeometry(format!(
                "kaiser beta {} must be finite and non-negative",
                self.kaiser_beta
            )));
        }

        for &notch in &self.notch_frequencies {
            if !notch.is_finite() || notch <= 0.0 {
                return Err(ResamplerError::InvalidFilterGeometry(format!(
                    "notch frequency {} must be positive",
                    notch
                )));
            }
            if (self.upsample_factor as f64 / notch).round() < 1.0 {
                return Err(ResamplerError::InvalidFilterGeometry(format!(
                    "notch frequency {} is too high for upsample factor {}",
                    notch, self.upsample_factor
                )));
            }
        }

        Ok(())
    }

    /// Parse parameters from the `[filter]` table of a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: FilterConfigFile =
            toml::from_str(content).map_err(|e| ResamplerError::Config(e.to_string()))?;
        file.filter.try_into()
    }

    /// Load parameters from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Named filter configurations used by the audio engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResamplerQuality {
    /// Short filter for modulated/feedback paths where CPU matters more
    Low,
    /// Long Kaiser filter for sample playback
    High,
}

impl ResamplerQuality {
    pub fn params(&self) -> FilterParams {
        match self {
            ResamplerQuality::Low => {
                FilterParams::new(64, 16, 0.5, WindowType::Kaiser).with_kaiser_beta(8.0)
            }
            ResamplerQuality::High => {
                FilterParams::new(512, 256, 0.5, WindowType::Kaiser).with_kaiser_beta(15.0)
            }
        }
    }
}

impl FromStr for ResamplerQuality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ResamplerQuality::Low),
            "high" => Ok(ResamplerQuality::High),
            _ => Err(format!("invalid quality: {} (expected low or high)", s)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FilterConfigFile {
    filter: FilterSection,
}

#[derive(Debug, Deserialize)]
struct FilterSection {
    upsample_factor: usize,
    taps_per_phase: usize,
    cutoff_frequency: f64,
    window_type: String,
    #[serde(default)]
    kaiser_beta: f64,
    #[serde(default)]
    notch_frequencies: Vec<f64>,
}

impl TryFrom<FilterSection> for FilterParams {
    type Error = ResamplerError;

    fn try_from(section: FilterSection) -> Result<Self> {
        Ok(Self {
            upsample_factor: section.upsample_factor,
            taps_per_phase: section.taps_per_phase,
            cutoff_frequency: section.cutoff_frequency,
            window_type: section.window_type.parse()?,
            kaiser_beta: section.kaiser_beta,
            notch_frequencies: section.notch_frequencies,
        })
    }
}
