pub mod types;
pub mod client;

pub use types::{ClassificationResult, HealthCheck, PlotsResponse, TopClass};
pub use client::ClassifierClient;

pub const CLASSIFY_PATH: &str = "/api/classify";
pub const HEALTH_PATH: &str = "/api/health";
pub const PLOTS_PATH: &str = "/api/plots/all";
