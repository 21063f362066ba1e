pub mod generate;

pub use generate::{impulse, sine, sine_at};
