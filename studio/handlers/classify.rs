use std::io::{Cursor, Read};
use tiny_http::{Request, Response};

use dermaview::probability::{format_percentage, sanitize_probability};
use dermaview::{ClassificationResult, ClassifierClient, ImageUpload, UploadError};

use crate::render::{bar, html_escape, render_page, Page};
use crate::state::{lock, SharedState};
use crate::util::multipart::{extract_boundary, extract_file};

const INVALID_IMAGE: &str = "Please select a valid image file";
const NO_IMAGE: &str = "Please select an image first";
const BACKEND_FAILED: &str = "Failed to classify image. Make sure the backend server is running.";

/// Headroom for multipart framing on top of the raw image limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

// ---------------------------------------------------------------------------
// GET /classify
// ---------------------------------------------------------------------------

pub fn handle_get(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = lock(&state);
    let upload    = st.upload.as_ref().map(UploadSummary::from);
    let result    = st.result.clone();
    let error     = st.error.clone();
    let can_reset = st.can_reset();
    drop(st);

    let upload_html = build_upload_section(upload.as_ref(), error.as_deref(), can_reset);
    let result_html = match &result {
        Some(r) => build_result_section(r),
        None    => r#"<p class="hint" style="text-align:center;padding:80px 0">Results will appear here after classification</p>"#.to_owned(),
    };

    crate::routes::html_response(render_page(Page::Classify, |tmpl| {
        tmpl
            .replace("{{UPLOAD_SECTION}}", &upload_html)
            .replace("{{RESULT_SECTION}}", &result_html)
    }))
}

// ---------------------------------------------------------------------------
// GET /classify/preview
// ---------------------------------------------------------------------------

pub fn handle_preview(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    let st = lock(&state);
    let image = st.upload.as_ref().map(|u| (u.bytes.clone(), u.mime_type()));
    drop(st);

    match image {
        Some((bytes, mime)) => crate::routes::image_response(bytes, mime),
        None                => crate::routes::not_found(),
    }
}

// ---------------------------------------------------------------------------
// POST /classify/upload
// ---------------------------------------------------------------------------

pub fn handle_upload(
    request: &mut Request,
    state: SharedState,
    client: &ClassifierClient,
) -> Response<Cursor<Vec<u8>>> {
    let max_bytes = client.config().max_upload_bytes;
    let outcome = read_upload(request, max_bytes);

    let mut st = lock(&state);
    match outcome {
        Ok(upload) => {
            log::info!("selected {} ({} bytes, {})", upload.file_name, upload.bytes.len(), upload.mime_type());
            st.select(upload);
        }
        Err(e) => {
            log::info!("rejected upload: {}", e);
            st.fail(upload_message(&e));
        }
    }
    drop(st);

    crate::routes::redirect("/classify")
}

fn read_upload(request: &mut Request, max_bytes: usize) -> Result<ImageUpload, UploadError> {
    if let Some(len) = request.body_length() {
        if len > max_bytes + MULTIPART_OVERHEAD {
            return Err(UploadError::TooLarge { size: len, limit: max_bytes });
        }
    }

    let content_type = crate::routes::content_type(request);
    let boundary = extract_boundary(&content_type).ok_or(UploadError::Empty)?;

    let body = read_body(request.as_reader(), max_bytes)?;
    let part = extract_file(&body, &boundary, "image").ok_or(UploadError::Empty)?;
    ImageUpload::from_bytes(part.file_name, part.bytes, max_bytes)
}

/// Reads at most `max_bytes + MULTIPART_OVERHEAD` bytes of the request body.
/// Chunked uploads carry no Content-Length, so the cap is enforced here too.
fn read_body<R: Read>(reader: R, max_bytes: usize) -> Result<Vec<u8>, UploadError> {
    let cap = max_bytes + MULTIPART_OVERHEAD;
    let mut body: Vec<u8> = Vec::new();
    if let Err(e) = reader.take(cap as u64 + 1).read_to_end(&mut body) {
        log::warn!("failed to read upload body: {}", e);
        return Err(UploadError::Empty);
    }
    if body.len() > cap {
        return Err(UploadError::TooLarge { size: body.len(), limit: max_bytes });
    }
    Ok(body)
}

fn upload_message(err: &UploadError) -> String {
    match err {
        UploadError::TooLarge { limit, .. } => {
            format!("Please select an image no larger than {} MB", limit / (1024 * 1024))
        }
        UploadError::Empty | UploadError::UnrecognizedFormat => INVALID_IMAGE.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// POST /classify/run
// ---------------------------------------------------------------------------

pub fn handle_run(state: SharedState, client: &ClassifierClient) -> Response<Cursor<Vec<u8>>> {
    let st = lock(&state);
    let upload = st.upload.clone();
    drop(st);

    let Some(upload) = upload else {
        lock(&state).fail(NO_IMAGE);
        return crate::routes::redirect("/classify");
    };

    // The lock is not held across the backend call.
    let outcome = client.classify(&upload);

    let outcome = match outcome {
        Ok(result) => {
            log::info!("classified {}: {}", upload.file_name, result.result);
            Ok(result)
        }
        Err(e) => {
            log::error!("classification of {} failed: {}", upload.file_name, e);
            Err(BACKEND_FAILED)
        }
    };
    if !lock(&state).record_outcome(&upload, outcome) {
        log::info!("discarded outcome for {}: selection changed during the call", upload.file_name);
    }

    crate::routes::redirect("/classify")
}

// ---------------------------------------------------------------------------
// POST /classify/reset
// ---------------------------------------------------------------------------

pub fn handle_reset(state: SharedState) -> Response<Cursor<Vec<u8>>> {
    lock(&state).reset();
    crate::routes::redirect("/classify")
}

// ---------------------------------------------------------------------------
// Page builders
// ---------------------------------------------------------------------------

/// What the upload panel shows about the selected image.
struct UploadSummary {
    file_name:  String,
    format:     &'static str,
    dimensions: Option<(u32, u32)>,
}

impl From<&ImageUpload> for UploadSummary {
    fn from(u: &ImageUpload) -> Self {
        UploadSummary { file_name: u.file_name.clone(), format: u.format_label(), dimensions: u.dimensions }
    }
}

fn build_upload_section(upload: Option<&UploadSummary>, error: Option<&str>, can_reset: bool) -> String {
    let preview = match upload {
        Some(u) => {
            let dims = u.dimensions
                .map(|(w, h)| format!(" · {}×{}", w, h))
                .unwrap_or_default();
            format!(
                r#"<img class="preview expandable" src="/classify/preview" alt="Preview of {name}">
<p class="hint">{name} · {format}{dims}</p>"#,
                name = html_escape(&u.file_name), format = u.format, dims = dims,
            )
        }
        None => r#"<p><strong>Click to upload image</strong></p><p class="hint">PNG, JPG, JPEG up to 10MB</p>"#.to_owned(),
    };

    let disabled = if upload.is_some() { "" } else { " disabled" };
    let reset = if can_reset {
        r#"<form method="POST" action="/classify/reset"><button type="submit" class="btn btn-secondary">Upload New Image</button></form>"#
    } else {
        ""
    };
    let error_html = error
        .map(|e| format!(r#"<div class="error-box">{}</div>"#, html_escape(e)))
        .unwrap_or_default();

    format!(
        r#"<form method="POST" action="/classify/upload" enctype="multipart/form-data" class="dropzone">
  <label for="file-upload" style="cursor:pointer">{preview}</label>
  <input type="file" id="file-upload" name="image" accept="image/*" onchange="this.form.submit()" style="margin-top:10px">
</form>
<form method="POST" action="/classify/run" onsubmit="var b=this.querySelector('button');b.disabled=true;b.textContent='Analyzing image with AI model...';">
  <button type="submit" class="btn btn-primary"{disabled}>Classify Image</button>
</form>
{reset}
{error_html}"#,
        preview = preview, disabled = disabled, reset = reset, error_html = error_html,
    )
}

fn build_result_section(result: &ClassificationResult) -> String {
    let (verdict_class, bar_class) = if result.is_cancer() { ("cancer", "red") } else { ("benign", "") };

    let verdict = format!(
        r#"<div class="verdict {cls}">
  <div>Binary Classification</div>
  <div class="headline">{headline}</div>
  <div class="hint">Confidence: {conf}%</div>
</div>"#,
        cls = verdict_class,
        headline = result.verdict(),
        conf = format_percentage(result.result_confidence),
    );

    let pair = format!(
        r#"<div class="pair">
  <div class="stat"><div>Cancer Probability</div><div class="big">{c}%</div>{cbar}</div>
  <div class="stat"><div>Not Cancer Probability</div><div class="big">{n}%</div>{nbar}</div>
</div>"#,
        c = format_percentage(result.cancer_probability),
        cbar = bar(sanitize_probability(result.cancer_probability), "red"),
        n = format_percentage(result.not_cancer_probability),
        nbar = bar(sanitize_probability(result.not_cancer_probability), ""),
    );

    let top = result.top_class.as_ref().map(|t| format!(
        r#"<h3>Top Class Prediction</h3>
<div class="row"><span>{label}</span><strong>{pct}%</strong></div>{bar}"#,
        label = html_escape(&t.label()),
        pct = format_percentage(t.probability),
        bar = bar(sanitize_probability(t.probability), bar_class),
    )).unwrap_or_default();

    let probs = result.class_probabilities();
    let rows = if probs.is_empty() {
        format!(
            r#"<div class="notice">Class probabilities data is not available. (Length: {})</div>"#,
            probs.len()
        )
    } else {
        probs.iter().map(|p| format!(
            r#"<div class="row"><span>{name}</span><strong>{pct}%</strong></div>{bar}"#,
            name = html_escape(&p.name),
            pct = format_percentage(Some(p.probability)),
            bar = bar(p.probability, ""),
        )).collect::<Vec<_>>().join("\n")
    };

    format!(
        r#"{verdict}
{pair}
{top}
<h3>All Class Probabilities ({count} Classes)</h3>
{rows}
<div class="notice" style="margin-top:18px"><strong>Disclaimer:</strong> This is an AI-assisted tool for educational purposes only. Always consult healthcare professionals for medical diagnosis and treatment.</div>"#,
        verdict = verdict, pair = pair, top = top, count = probs.len(), rows = rows,
    )
}
