use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::probability::raw::integer_index;
use crate::probability::{normalize, NormalizedProbabilityList};

/// Number of training plots the backend can produce.
pub const EXPECTED_PLOT_COUNT: usize = 4;

/// Highest-scoring class reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TopClass {
    #[serde(default, deserialize_with = "lenient_integer")]
    pub index: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub probability: Option<f64>,
}

impl TopClass {
    /// `Class 3: mel`, or `Class 3: Unknown` when the name is missing. Without
    /// an index only the name is shown.
    pub fn label(&self) -> String {
        let name = self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Unknown");
        match self.index {
            Some(index) => format!("Class {}: {}", index, name),
            None => name.to_owned(),
        }
    }
}

/// Response of `POST /api/classify`.
///
/// Numeric fields are optional so a partial payload still renders; display
/// code sanitizes them through `sanitize_probability`. The per-class field is
/// kept untyped because the backend emits it in several shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClassificationResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: String,
    #[serde(default)]
    pub result_confidence: Option<f64>,
    #[serde(default)]
    pub cancer_probability: Option<f64>,
    #[serde(default)]
    pub not_cancer_probability: Option<f64>,
    #[serde(default)]
    pub top_class: Option<TopClass>,
    #[serde(default)]
    pub all_class_probabilities: Value,
}

impl ClassificationResult {
    pub fn is_cancer(&self) -> bool {
        self.result == "cancer"
    }

    /// Headline for the binary verdict.
    pub fn verdict(&self) -> &'static str {
        if self.is_cancer() { "Cancer Detected" } else { "Not Cancer" }
    }

    /// Per-class probabilities in display order.
    pub fn class_probabilities(&self) -> NormalizedProbabilityList {
        normalize(Some(&self.all_class_probabilities))
    }
}

/// Response of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HealthCheck {
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model_loaded: bool,
    #[serde(default, deserialize_with = "lenient_count")]
    pub num_classes: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count_or_zero")]
    pub expected_classes: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub supported_classes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cancer_classes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub not_cancer_classes: Vec<String>,
}

impl HealthCheck {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    pub fn is_cancer_class(&self, name: &str) -> bool {
        self.cancer_classes.iter().any(|c| c == name)
    }

    /// `num_classes` as text, `N/A` when the model has not reported it.
    pub fn num_classes_label(&self) -> String {
        self.num_classes.map(|n| n.to_string()).unwrap_or_else(|| "N/A".into())
    }
}

/// Response of `GET /api/plots/all`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlotsResponse {
    /// Plot name -> server-relative image path, in the order the backend sent them.
    #[serde(default, deserialize_with = "null_as_default")]
    pub plots: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_count_or_zero")]
    pub count: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub all_available: bool,
}

impl PlotsResponse {
    /// `(name, path)` pairs; entries whose path is not a string are skipped.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.plots
            .iter()
            .filter_map(|(name, path)| path.as_str().map(|p| (name.as_str(), p)))
    }

    pub fn has_plots(&self) -> bool {
        self.count > 0
    }
}

// Integer fields may arrive as `4.0` and any field may be `null`; neither
// fails the decode.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `4` and `4.0` decode to `Some(4)`; `null`, fractions and non-numbers to `None`.
fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(integer_index(&value))
}

fn lenient_count<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64>,
{
    Ok(lenient_integer(deserializer)?.and_then(|n| T::try_from(n).ok()))
}

fn lenient_count_or_zero<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + Default,
{
    Ok(lenient_count(deserializer)?.unwrap_or_default())
}

/// `confusion_matrix` -> `confusion matrix`.
pub fn plot_title(name: &str) -> String {
    name.replace('_', " ")
}
