use serde_json::{Map, Value};

use crate::probability::clamp::clamp_value;

/// The three encodings the backend uses for `all_class_probabilities`.
///
/// Each variant borrows from the parsed payload; nothing is copied until
/// normalization builds the output list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawProbabilities<'a> {
    /// `[0.2, 0.7, 0.1]`, labelled by position.
    NumberArray(&'a [Value]),
    /// `[{ "class_index": 0, "class_name": "mel", "probability": 0.7 }, ...]`
    ObjectArray(&'a [Value]),
    /// `{ "mel": 0.7, "nv": 0.2 }`
    NameMap(&'a Map<String, Value>),
}

impl<'a> RawProbabilities<'a> {
    /// Classifies a raw value by shape.
    ///
    /// Returns `None` for `null` and for scalars; callers treat that as "no
    /// probabilities" rather than as an error.
    pub fn detect(value: &'a Value) -> Option<Self> {
        match value {
            Value::Array(items) => {
                if items.first().is_some_and(is_probability_record) {
                    Some(RawProbabilities::ObjectArray(items))
                } else {
                    Some(RawProbabilities::NumberArray(items))
                }
            }
            Value::Object(map) => Some(RawProbabilities::NameMap(map)),
            _ => None,
        }
    }

    /// Number of source entries (array length or map key count).
    pub fn len(&self) -> usize {
        match self {
            RawProbabilities::NumberArray(items) | RawProbabilities::ObjectArray(items) => items.len(),
            RawProbabilities::NameMap(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the normalized output of this shape is sorted by probability.
    /// Positional arrays keep their order.
    pub fn is_sorted_shape(&self) -> bool {
        !matches!(self, RawProbabilities::NumberArray(_))
    }
}

/// A record carries a probability plus at least one of the label fields.
fn is_probability_record(value: &Value) -> bool {
    match value.as_object() {
        Some(obj) => {
            obj.contains_key("probability")
                && (obj.contains_key("class_name") || obj.contains_key("class_index"))
        }
        None => false,
    }
}

/// One element of an `ObjectArray`, with loose fields already resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProbabilityItem {
    pub class_index: Option<i64>,
    pub class_name: Option<String>,
    pub probability: f64,
}

impl ClassProbabilityItem {
    /// Reads a record leniently. Non-object elements, wrongly typed fields and
    /// fractional indices all resolve to "absent" and a probability of `0`.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return ClassProbabilityItem { class_index: None, class_name: None, probability: 0.0 };
        };

        let class_name = obj
            .get("class_name")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        let class_index = obj.get("class_index").and_then(integer_index);

        let probability = obj.get("probability").map(clamp_value).unwrap_or(0.0);

        ClassProbabilityItem { class_index, class_name, probability }
    }

    /// `class_name`, else `Class <index>`, else `Class Unknown`.
    pub fn label(&self) -> String {
        match (&self.class_name, self.class_index) {
            (Some(name), _) => name.clone(),
            (None, Some(index)) => format!("Class {}", index),
            (None, None) => "Class Unknown".to_owned(),
        }
    }
}

/// Accepts `2` and `2.0`; rejects `2.5`, strings and everything else.
pub(crate) fn integer_index(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
