pub mod analysis;
pub mod config;
pub mod constants;
pub mod design;
pub mod error;
pub mod filter_file;
pub mod resampler;

pub use config::{FilterParams, ResamplerQuality, WindowType};
pub use design::{PolyphaseFilter, decompose, design_polyphase_filter, synthesize};
pub use error::{ResamplerError, Result};
pub use resampler::{Resampler, resample};
