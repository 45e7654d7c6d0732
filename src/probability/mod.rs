pub mod clamp;
pub mod raw;
pub mod normalize;

pub use clamp::{clamp_probability, format_percentage, sanitize_probability};
pub use raw::{ClassProbabilityItem, RawProbabilities};
pub use normalize::{normalize, NormalizedProbability, NormalizedProbabilityList};
