//! Plain-text renderings used by the `dermaview` CLI.

use std::fmt::Write;

use crate::api::types::{plot_title, ClassificationResult, HealthCheck, PlotsResponse, EXPECTED_PLOT_COUNT};
use crate::probability::{format_percentage, sanitize_probability, NormalizedProbability};

const BAR_WIDTH: usize = 24;

/// `[##########..............]` proportional to a sanitized probability.
pub fn text_bar(prob: Option<f64>) -> String {
    let filled = (sanitize_probability(prob) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

pub fn classification_report(result: &ClassificationResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", result.verdict());
    let _ = writeln!(out, "  Confidence:             {}%", format_percentage(result.result_confidence));
    let _ = writeln!(
        out,
        "  Cancer probability:     {:>6}% {}",
        format_percentage(result.cancer_probability),
        text_bar(result.cancer_probability)
    );
    let _ = writeln!(
        out,
        "  Not cancer probability: {:>6}% {}",
        format_percentage(result.not_cancer_probability),
        text_bar(result.not_cancer_probability)
    );

    if let Some(top) = &result.top_class {
        let _ = writeln!(out);
        let _ = writeln!(out, "Top class");
        let _ = writeln!(out, "  {} ({}%)", top.label(), format_percentage(top.probability));
    }

    let probs = result.class_probabilities();
    let _ = writeln!(out);
    let _ = writeln!(out, "All class probabilities ({} classes)", probs.len());
    if probs.is_empty() {
        let _ = writeln!(out, "  Class probabilities data is not available. (Length: 0)");
    } else {
        out.push_str(&probability_table(&probs));
    }
    out
}

pub fn probability_table(probs: &[NormalizedProbability]) -> String {
    let width = probs.iter().map(|p| p.name.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for p in probs {
        let _ = writeln!(
            out,
            "  {:<width$}  {:>6}% {}",
            p.name,
            format_percentage(Some(p.probability)),
            text_bar(Some(p.probability)),
            width = width
        );
    }
    out
}

pub fn health_report(health: &HealthCheck) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Status:             {}", health.status);
    let _ = writeln!(out, "Model loaded:       {}", if health.model_loaded { "Yes" } else { "No" });
    let _ = writeln!(out, "Number of classes:  {}", health.num_classes_label());
    let _ = writeln!(out, "Expected classes:   {}", health.expected_classes);
    let _ = writeln!(out, "Supported classes:  {}", health.supported_classes.len());
    let _ = writeln!(out, "Cancer classes:     {}", health.cancer_classes.len());
    let _ = writeln!(out, "Not cancer classes: {}", health.not_cancer_classes.len());
    if !health.supported_classes.is_empty() {
        let tagged: Vec<String> = health
            .supported_classes
            .iter()
            .map(|c| if health.is_cancer_class(c) { format!("{} (cancer)", c) } else { c.clone() })
            .collect();
        let _ = writeln!(out, "  {}", tagged.join(", "));
    }
    out
}

/// `url_for` maps a server-relative plot path to an absolute URL.
pub fn plots_report<F>(plots: &PlotsResponse, url_for: F) -> String
where
    F: Fn(&str) -> String,
{
    if !plots.has_plots() {
        return "No plots available. Please train the model first.\n".to_owned();
    }
    let mut out = String::new();
    let _ = write!(out, "Available plots: {} of {}", plots.count, EXPECTED_PLOT_COUNT);
    if plots.all_available {
        out.push_str(" (all plots available)");
    }
    out.push('\n');
    for (name, path) in plots.entries() {
        let _ = writeln!(out, "  {:<24} {}", plot_title(name), url_for(path));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bars_are_fixed_width() {
        assert_eq!(text_bar(Some(0.0)), format!("[{}]", ".".repeat(BAR_WIDTH)));
        assert_eq!(text_bar(Some(5.0)), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(text_bar(Some(0.5)).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn report_lists_sorted_classes() {
        let result: ClassificationResult = serde_json::from_value(json!({
            "result": "cancer",
            "result_confidence": 0.8,
            "cancer_probability": 0.8,
            "not_cancer_probability": 0.2,
            "top_class": { "index": 0, "name": "mel", "probability": 0.7 },
            "all_class_probabilities": { "nv": 0.2, "mel": 0.7 }
        }))
        .unwrap();
        let text = classification_report(&result);
        assert!(text.starts_with("Cancer Detected"));
        assert!(text.contains("Class 0: mel (70.00%)"));
        assert!(text.contains("All class probabilities (2 classes)"));
        assert!(text.find("  mel ").unwrap() < text.find("  nv ").unwrap());
    }

    #[test]
    fn report_notes_missing_probabilities() {
        let result = ClassificationResult::default();
        let text = classification_report(&result);
        assert!(text.starts_with("Not Cancer"));
        assert!(text.contains("not available. (Length: 0)"));
    }

    #[test]
    fn plots_report_empty_and_full() {
        let empty = PlotsResponse::default();
        assert!(plots_report(&empty, |p| p.to_owned()).starts_with("No plots available"));

        let plots: PlotsResponse = serde_json::from_value(json!({
            "plots": { "roc_curve": "/p/roc.png" },
            "count": 1,
            "all_available": false
        }))
        .unwrap();
        let text = plots_report(&plots, |p| format!("http://host{}", p));
        assert!(text.contains("Available plots: 1 of 4"));
        assert!(text.contains("roc curve"));
        assert!(text.contains("http://host/p/roc.png"));
    }
}
