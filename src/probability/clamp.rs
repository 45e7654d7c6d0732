use serde_json::Value;

/// Constrains a probability to `[0, 1]`.
///
/// Negative and non-finite inputs collapse to `0`; anything above `1` is
/// clipped to `1` rather than rejected. `-0.0` comes back as `+0.0`.
pub fn clamp_probability(x: f64) -> f64 {
    if !x.is_finite() || x <= 0.0 {
        0.0
    } else {
        x.min(1.0)
    }
}

/// Clamps a raw JSON value. Strings, booleans, objects and `null` count as
/// "not a number" and yield `0`.
pub fn clamp_value(value: &Value) -> f64 {
    value.as_f64().map(clamp_probability).unwrap_or(0.0)
}

/// Clamps an optional probability; a missing value is treated as `0`.
pub fn sanitize_probability(prob: Option<f64>) -> f64 {
    prob.map(clamp_probability).unwrap_or(0.0)
}

/// Formats a probability as a percentage with two decimals, without the `%`.
///
/// `Some(0.12345)` -> `"12.35"`, `None` -> `"0.00"`.
pub fn format_percentage(prob: Option<f64>) -> String {
    format!("{:.2}", sanitize_probability(prob) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn in_range_values_pass_through() {
        for x in [0.0, 0.25, 0.5, 0.999, 1.0] {
            assert_eq!(clamp_probability(x), x);
        }
    }

    #[test]
    fn negative_and_non_finite_become_zero() {
        for x in [-0.1, -1e9, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(clamp_probability(x), 0.0);
        }
    }

    #[test]
    fn negative_zero_is_positive_zero() {
        assert!(clamp_probability(-0.0).is_sign_positive());
        assert_eq!(format_percentage(Some(-0.0)), "0.00");
    }

    #[test]
    fn above_one_is_clipped() {
        assert_eq!(clamp_probability(1.0001), 1.0);
        assert_eq!(clamp_probability(42.0), 1.0);
    }

    #[test]
    fn non_numeric_json_is_zero() {
        assert_eq!(clamp_value(&json!("0.5")), 0.0);
        assert_eq!(clamp_value(&json!(true)), 0.0);
        assert_eq!(clamp_value(&json!(null)), 0.0);
        assert_eq!(clamp_value(&json!({ "p": 0.5 })), 0.0);
        assert_eq!(clamp_value(&json!(0.5)), 0.5);
        assert_eq!(clamp_value(&json!(3)), 1.0);
    }

    #[test]
    fn percentage_formatting() {
        assert_eq!(format_percentage(Some(0.12345)), "12.35");
        assert_eq!(format_percentage(Some(1.5)), "100.00");
        assert_eq!(format_percentage(Some(f64::NAN)), "0.00");
        assert_eq!(format_percentage(None), "0.00");
    }
}
