use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::probability::clamp::clamp_value;
use crate::probability::raw::{ClassProbabilityItem, RawProbabilities};

/// A display-ready `(label, probability)` pair.
///
/// `probability` is always finite and within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProbability {
    pub name: String,
    pub probability: f64,
}

impl NormalizedProbability {
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        NormalizedProbability { name: name.into(), probability }
    }
}

pub type NormalizedProbabilityList = Vec<NormalizedProbability>;

/// Normalizes the `all_class_probabilities` field of a classification payload.
///
/// `None` stands for a missing field. Unrecognized shapes yield an empty list;
/// this function never fails.
///
/// Name maps and record arrays come back sorted by probability, highest
/// first, with ties kept in encounter order. Plain number arrays keep their
/// positional order.
pub fn normalize(raw: Option<&Value>) -> NormalizedProbabilityList {
    match raw.and_then(RawProbabilities::detect) {
        Some(shape) => normalize_shape(shape),
        None => Vec::new(),
    }
}

/// Normalizes an already-detected shape.
pub fn normalize_shape(shape: RawProbabilities<'_>) -> NormalizedProbabilityList {
    let mut list: NormalizedProbabilityList = match shape {
        RawProbabilities::NumberArray(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| NormalizedProbability::new(format!("Class {}", i), clamp_value(v)))
            .collect(),
        RawProbabilities::ObjectArray(items) => items
            .iter()
            .map(|v| {
                let item = ClassProbabilityItem::from_value(v);
                NormalizedProbability::new(item.label(), item.probability)
            })
            .collect(),
        RawProbabilities::NameMap(map) => map
            .iter()
            .map(|(k, v)| NormalizedProbability::new(k.as_str(), clamp_value(v)))
            .collect(),
    };

    if shape.is_sorted_shape() {
        sort_descending(&mut list);
    }
    list
}

// `sort_by` is stable and every probability is finite by construction.
fn sort_descending(list: &mut NormalizedProbabilityList) {
    list.sort_by(|a, b| b.probability.total_cmp(&a.probability));
}
