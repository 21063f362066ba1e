//! JSON persistence for precomputed filters
//!
//! Filters are designed offline and loaded by the audio engine at startup:
//!
//! ```json
//! {
//!   "upsample_factor": 4,
//!   "taps_per_phase": 8,
//!   "latency": 4,
//!   "phases": [[...], [...], [...], [...], [...]]
//! }
//! ```

use crate::design::PolyphaseFilter;
use crate::error::{ResamplerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk layout of a [`PolyphaseFilter`]
#[derive(Debug, Serialize, Deserialize)]
pub struct FilterFile {
    upsample_factor: usize,
    taps_per_phase: usize,
    latency: usize,
    phases: Vec<Vec<f32>>,
}

impl From<PolyphaseFilter> for FilterFile {
    fn from(filter: PolyphaseFilter) -> Self {
        Self {
            upsample_factor: filter.upsample_factor(),
            taps_per_phase: filter.taps_per_phase(),
            latency: filter.latency(),
            phases: filter.phases().map(|phase| phase.to_vec()).collect(),
        }
    }
}

impl TryFrom<FilterFile> for PolyphaseFilter {
    type Error = ResamplerError;

    fn try_from(file: FilterFile) -> Result<Self> {
        if file.phases.len() != file.upsample_factor + 1 {
            return Err(ResamplerError::InvalidFilterGeometry(format!(
                "expected {} phases, found {}",
                file.upsample_factor + 1,
                file.phases.len()
            )));
        }
        if let Some((index, phase)) = file
            .phases
            .iter()
            .enumerate()
            .find(|(_, phase)| phase.len() != file.taps_per_phase)
        {
            return Err(ResamplerError::InvalidFilterGeometry(format!(
                "phase {} has {} taps, expected {}",
                index,
                phase.len(),
                file.taps_per_phase
            )));
        }

        PolyphaseFilter::from_parts(
            file.upsample_factor,
            file.taps_per_phase,
            file.latency,
            file.phases.into_iter().flatten().collect(),
        )
    }
}

pub fn to_json(filter: &PolyphaseFilter) -> Result<String> {
    Ok(serde_json::to_string(filter)?)
}

pub fn from_json(json: &str) -> Result<PolyphaseFilter> {
    Ok(serde_json::from_str(json)?)
}

/// Write a filter to `path` as JSON
pub fn save(filter: &PolyphaseFilter, path: &Path) -> Result<()> {
    fs::write(path, to_json(filter)?)?;
    log::debug!("Saved filter to {}", path.display());
    Ok(())
}

/// Load a filter written by [`save`]
///
/// # Errors
/// I/O and JSON errors are passed through; a well-formed file with the wrong
/// phase layout fails deserialization with the geometry message.
pub fn load(path: &Path) -> Result<PolyphaseFilter> {
    let content = fs::read_to_string(path)?;
    let filter = from_json(&content)?;
    log::debug!(
        "Loaded {}x{} filter from {}",
        filter.upsample_factor(),
        filter.taps_per_phase(),
        path.display()
    );
    Ok(filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterParams, WindowType};
    use crate::design::design_polyphase_filter;

    #[test]
    fn test_json_roundtrip_exact() {
        let params = FilterParams::new(4, 8, 0.4, WindowType::Hann);
        let filter = design_polyphase_filter(&params).unwrap();
        let decoded = from_json(&to_json(&filter).unwrap()).unwrap();
        assert_eq!(decoded, filter);
    }

    #[test]
    fn test_json_layout() {
        let filter = PolyphaseFilter::from_parts(1, 8, 4, vec![0.5; 16]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&to_json(&filter).unwrap()).unwrap();
        assert_eq!(value["upsample_factor"], 1);
        assert_eq!(value["latency"], 4);
        assert_eq!(value["phases"].as_array().unwrap().len(), 2);
        assert_eq!(value["phases"][1].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_wrong_phase_count_rejected() {
        let json = r#"{"upsample_factor":2,"taps_per_phase":1,"latency":0,"phases":[[1.0],[2.0]]}"#;
        let err = from_json(json).unwrap_err();
        assert!(matches!(err, ResamplerError::Serialization(_)));
        assert!(err.to_string().contains("expected 3 phases"));
    }

    #[test]
    fn test_ragged_phase_rejected() {
        let json =
            r#"{"upsample_factor":1,"taps_per_phase":2,"latency":0,"phases":[[1.0,2.0],[3.0]]}"#;
        let err = from_json(json).unwrap_err();
        assert!(err.to_string().contains("phase 1 has 1 taps"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            from_json("{not json"),
            Err(ResamplerError::Serialization(_))
        ));
    }
}
