pub mod fft;
pub mod lowpass;
pub mod notch;
pub mod polyphase;
pub mod window;

pub use lowpass::synthesize;
pub use notch::build_notch_cascade;
pub use polyphase::{PolyphaseFilter, decompose, design_polyphase_filter};
pub use window::{WindowAnalysis, analyze_window, build_window};
