use std::io::Cursor;
use tiny_http::Response;

use dermaview::api::types::{plot_title, EXPECTED_PLOT_COUNT};
use dermaview::{ClassifierClient, HealthCheck, PlotsResponse};

use crate::render::{html_escape, render_page, Page};

// ---------------------------------------------------------------------------
// GET /graphs
// ---------------------------------------------------------------------------

/// Fetches health and plots on every page load; both panels degrade to a
/// notice when the backend is unreachable.
pub fn handle_get(client: &ClassifierClient) -> Response<Cursor<Vec<u8>>> {
    let health = client
        .health()
        .map_err(|e| log::warn!("health check failed: {}", e))
        .ok();
    let plots = client
        .plots()
        .map_err(|e| log::warn!("plot listing failed: {}", e))
        .ok();

    let health_html = build_health_section(health.as_ref());
    let plots_html  = build_plots_section(plots.as_ref(), |p| client.plot_url(p));

    crate::routes::html_response(render_page(Page::Graphs, |tmpl| {
        tmpl
            .replace("{{HEALTH_SECTION}}", &health_html)
            .replace("{{PLOTS_SECTION}}", &plots_html)
    }))
}

// ---------------------------------------------------------------------------
// Health panel
// ---------------------------------------------------------------------------

fn build_health_section(health: Option<&HealthCheck>) -> String {
    let Some(h) = health else {
        return r#"<p class="hint">Unable to load health check information</p>"#.to_owned();
    };

    let status_cls = if h.is_healthy() { "status-ok" } else { "status-bad" };
    let loaded_cls = if h.model_loaded { "status-ok" } else { "status-bad" };

    let chips: String = h.supported_classes.iter().map(|c| {
        let cls = if h.is_cancer_class(c) { "chip-cancer" } else { "chip-benign" };
        format!(r#"<span class="{}">{}</span>"#, cls, html_escape(c))
    }).collect();

    format!(
        r#"<div class="pair">
  <div class="stat"><div>Status</div><div class="big {status_cls}" style="text-transform:capitalize">{status}</div></div>
  <div class="stat"><div>Model Loaded</div><div class="big {loaded_cls}">{loaded}</div></div>
</div>
<div class="pair">
  <div class="stat">
    <h3 style="margin-top:0">Model Configuration</h3>
    <div>Number of Classes: <strong>{num}</strong></div>
    <div>Expected Classes: <strong>{expected}</strong></div>
  </div>
  <div class="stat">
    <h3 style="margin-top:0">Class Information</h3>
    <div>Supported Classes: <strong>{supported}</strong></div>
    <div>Cancer Classes: <strong>{cancer}</strong></div>
    <div>Not Cancer Classes: <strong>{not_cancer}</strong></div>
  </div>
</div>
<h3>Supported Classes</h3>
<div class="chips">{chips}</div>"#,
        status_cls = status_cls,
        status     = html_escape(&h.status),
        loaded_cls = loaded_cls,
        loaded     = if h.model_loaded { "Yes" } else { "No" },
        num        = h.num_classes_label(),
        expected   = h.expected_classes,
        supported  = h.supported_classes.len(),
        cancer     = h.cancer_classes.len(),
        not_cancer = h.not_cancer_classes.len(),
        chips      = chips,
    )
}

// ---------------------------------------------------------------------------
// Plots panel
// ---------------------------------------------------------------------------

fn build_plots_section<F>(plots: Option<&PlotsResponse>, url_for: F) -> String
where
    F: Fn(&str) -> String,
{
    let plots = match plots {
        Some(p) if p.has_plots() => p,
        _ => return r#"<p class="hint">No plots available. Please train the model first.</p>"#.to_owned(),
    };

    let all = if plots.all_available { r#" <span class="status-ok">✓ All plots available</span>"# } else { "" };

    let cards: String = plots.entries().map(|(name, path)| {
        let title = html_escape(&plot_title(name));
        format!(
            r#"<div class="stat"><h3>{title}</h3><img class="expandable" src="{src}" alt="{title}" onerror="this.replaceWith(Object.assign(document.createElement('p'),{{className:'status-bad',textContent:'Failed to load plot'}}))"></div>"#,
            title = title,
            src   = html_escape(&url_for(path)),
        )
    }).collect();

    format!(
        r#"<p><strong>Available Plots:</strong> {count} of {expected}{all}</p>
<div class="plots">{cards}</div>"#,
        count = plots.count, expected = EXPECTED_PLOT_COUNT, all = all, cards = cards,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn health_unavailable() {
        assert!(build_health_section(None).contains("Unable to load health check information"));
    }

    #[test]
    fn health_panel_marks_cancer_classes() {
        let h: HealthCheck = serde_json::from_value(json!({
            "status": "healthy",
            "model_loaded": false,
            "num_classes": 7,
            "expected_classes": 7,
            "supported_classes": ["mel", "nv"],
            "cancer_classes": ["mel"],
            "not_cancer_classes": ["nv"]
        })).unwrap();
        let html = build_health_section(Some(&h));
        assert!(html.contains(r#"<span class="chip-cancer">mel</span>"#));
        assert!(html.contains(r#"<span class="chip-benign">nv</span>"#));
        assert!(html.contains(">No</div>"));
        assert!(html.contains("Number of Classes: <strong>7</strong>"));
    }

    #[test]
    fn plots_panel() {
        assert!(build_plots_section(None, |p| p.to_owned()).contains("No plots available"));

        let plots: PlotsResponse = serde_json::from_value(json!({
            "plots": { "training_history": "/plots/history.png" },
            "count": 1,
            "all_available": false
        })).unwrap();
        let html = build_plots_section(Some(&plots), |p| format!("http://plots{}", p));
        assert!(html.contains("1 of 4"));
        assert!(html.contains("<h3>training history</h3>"));
        assert!(html.contains(r#"src="http://plots/plots/history.png""#));
        assert!(!html.contains("All plots available"));
    }
}
