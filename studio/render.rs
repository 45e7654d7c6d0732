/// Central template renderer for the dermaview studio.
///
/// The studio uses a single HTML template (`studio/assets/studio.html`) with
/// placeholder tokens like `{{TOKEN}}`. This module loads the template at
/// compile time and exposes `render_page`, which takes a closure to do
/// tab-specific placeholder substitution.
///
/// Tab-specific placeholders that were not replaced by the closure are
/// blanked so raw `{{TOKEN}}` strings never reach the browser.

const TEMPLATE: &str = include_str!("assets/studio.html");

/// Which tab is active — controls the nav highlight and the JS `ACTIVE_TAB`
/// variable that shows the matching section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Page {
    Classify = 0,
    Graphs   = 1,
}

/// Renders the full studio page.
pub fn render_page<F>(page: Page, fill: F) -> String
where
    F: FnOnce(String) -> String,
{
    let mut html = TEMPLATE.to_owned();

    html = html.replace("{{ACTIVE_TAB}}", &(page as u8).to_string());
    html = html.replace("{{NAV_CLASSIFY}}", if page == Page::Classify { "active" } else { "" });
    html = html.replace("{{NAV_GRAPHS}}",   if page == Page::Graphs { "active" } else { "" });

    html = fill(html);

    blank_remaining(html)
}

/// Replaces any `{{TOKEN}}` that wasn't substituted with an empty string.
fn blank_remaining(mut html: String) -> String {
    while let Some(start) = html.find("{{") {
        if let Some(end) = html[start..].find("}}") {
            let abs_end = start + end + 2;
            html.replace_range(start..abs_end, "");
        } else {
            break;
        }
    }
    html
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
     .replace('<', "&lt;")
     .replace('>', "&gt;")
     .replace('"', "&quot;")
}

/// Horizontal progress bar filled to a probability already clamped to `[0, 1]`.
pub fn bar(probability: f64, class: &str) -> String {
    format!(
        r#"<div class="bar-wrap"><div class="bar-fill {}" style="width:{:.2}%"></div></div>"#,
        class,
        probability * 100.0
    )
}
