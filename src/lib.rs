pub mod probability;
pub mod api;
pub mod config;
pub mod error;
pub mod upload;
pub mod report;

// Convenience re-exports
pub use probability::{normalize, clamp_probability, NormalizedProbability, NormalizedProbabilityList, RawProbabilities};
pub use api::{ClassifierClient, ClassificationResult, HealthCheck, PlotsResponse, TopClass};
pub use config::Config;
pub use error::{ClientError, ConfigError, UploadError};
pub use upload::ImageUpload;
