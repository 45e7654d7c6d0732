use serde_json::{json, Map, Value};

use dermaview::{clamp_probability, normalize, NormalizedProbability, RawProbabilities};

fn np(name: &str, probability: f64) -> NormalizedProbability {
    NormalizedProbability::new(name, probability)
}

#[test]
fn clamp_properties() {
    for i in 0..=100 {
        let x = i as f64 / 100.0;
        assert_eq!(clamp_probability(x), x);
    }
    for x in [-0.0001, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        assert_eq!(clamp_probability(x), 0.0);
    }
    for x in [1.0000001, 2.0, 1e300] {
        assert_eq!(clamp_probability(x), 1.0);
    }
}

#[test]
fn empty_inputs() {
    assert!(RawProbabilities::detect(&json!([])).unwrap().is_empty());
    assert!(RawProbabilities::detect(&json!({})).unwrap().is_empty());
    assert!(normalize(None).is_empty());
    assert!(normalize(Some(&Value::Null)).is_empty());
    assert!(normalize(Some(&json!([]))).is_empty());
}

#[test]
fn number_array_is_positional() {
    assert_eq!(
        normalize(Some(&json!([0.2, 0.7, 0.1]))),
        vec![np("Class 0", 0.2), np("Class 1", 0.7), np("Class 2", 0.1)]
    );
}

#[test]
fn name_map_is_sorted() {
    assert_eq!(
        normalize(Some(&json!({ "mel": 0.7, "nv": 0.2, "bcc": 0.1 }))),
        vec![np("mel", 0.7), np("nv", 0.2), np("bcc", 0.1)]
    );
}

#[test]
fn object_array_is_sorted() {
    assert_eq!(
        normalize(Some(&json!([
            { "class_name": "nv", "probability": 0.3 },
            { "class_name": "mel", "probability": 0.6 }
        ]))),
        vec![np("mel", 0.6), np("nv", 0.3)]
    );
    assert_eq!(
        normalize(Some(&json!([{ "class_index": 2, "probability": 0.4 }]))),
        vec![np("Class 2", 0.4)]
    );
}

#[test]
fn length_is_preserved() {
    let inputs = [
        json!([0.1, -2, "x", null, 9]),
        json!({ "a": 0.1, "b": "x", "c": null }),
        json!([{ "class_name": "a", "probability": 0.1 }, 7, { "probability": 0.3 }]),
    ];
    let expected = [5, 3, 3];
    for (input, len) in inputs.iter().zip(expected) {
        let shape = RawProbabilities::detect(input).unwrap();
        assert_eq!(shape.len(), len);
        assert!(!shape.is_empty());
        let out = normalize(Some(input));
        assert_eq!(out.len(), shape.len());
        assert!(out.iter().all(|p| p.probability.is_finite() && (0.0..=1.0).contains(&p.probability)));
    }
}

#[test]
fn renormalizing_output_as_name_map_keeps_order() {
    let first = normalize(Some(&json!({ "ak": 0.05, "mel": 0.55, "nv": 0.3, "bkl": 0.1 })));
    let as_map: Map<String, Value> = first
        .iter()
        .map(|p| (p.name.clone(), json!(p.probability)))
        .collect();
    let second = normalize(Some(&Value::Object(as_map)));
    assert_eq!(first, second);
}
