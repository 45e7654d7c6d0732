use std::io::Cursor;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use dermaview::ClassifierClient;

use crate::state::SharedState;
use crate::handlers;

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn headers(pairs: &[(&str, &str)]) -> Vec<Header> {
    pairs
        .iter()
        .filter_map(|(field, value)| Header::from_bytes(field.as_bytes(), value.as_bytes()).ok())
        .collect()
}

fn bytes_response(status: u16, content_type: &str, bytes: Vec<u8>) -> Response<Cursor<Vec<u8>>> {
    let len = bytes.len();
    Response::new(
        StatusCode(status),
        headers(&[("Content-Type", content_type)]),
        Cursor::new(bytes),
        Some(len),
        None,
    )
}

pub fn html_response(body: String) -> Response<Cursor<Vec<u8>>> {
    bytes_response(200, "text/html; charset=utf-8", body.into_bytes())
}

/// Serves raw image bytes, e.g. the preview of the selected upload.
pub fn image_response(bytes: Vec<u8>, mime: &str) -> Response<Cursor<Vec<u8>>> {
    let mut response = bytes_response(200, mime, bytes);
    for h in headers(&[("Cache-Control", "no-store")]) {
        response.add_header(h);
    }
    response
}

pub fn redirect(location: &str) -> Response<Cursor<Vec<u8>>> {
    Response::new(
        StatusCode(303),
        headers(&[("Location", location), ("Content-Length", "0")]),
        Cursor::new(Vec::new()),
        Some(0),
        None,
    )
}

pub fn not_found() -> Response<Cursor<Vec<u8>>> {
    bytes_response(404, "text/plain", b"404 Not Found".to_vec())
}

/// Returns the value of the request's `Content-Type` header, or `""`.
pub fn content_type(request: &Request) -> String {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Request dispatcher
// ---------------------------------------------------------------------------

/// Dispatches incoming requests to the appropriate handler.
///
/// Handlers receive a `&mut Request` so that the dispatcher retains
/// ownership and can call `request.respond(response)` at the end.
pub fn dispatch(mut request: Request, state: SharedState, client: &ClassifierClient) {
    let method = request.method().clone();
    let url    = request.url().to_owned();

    // Query strings carry nothing the studio reads.
    let path = match url.find('?') {
        Some(pos) => url[..pos].to_owned(),
        None      => url.clone(),
    };
    log::debug!("{} {}", method, path);

    let response = match (method, path.as_str()) {
        // ── Root redirect ─────────────────────────────────────────────────
        (Method::Get, "/") => redirect("/classify"),

        // ── Classify ─────────────────────────────────────────────────────
        (Method::Get,  "/classify")         => handlers::classify::handle_get(state),
        (Method::Get,  "/classify/preview") => handlers::classify::handle_preview(state),
        (Method::Post, "/classify/upload")  => handlers::classify::handle_upload(&mut request, state, client),
        (Method::Post, "/classify/run")     => handlers::classify::handle_run(state, client),
        (Method::Post, "/classify/reset")   => handlers::classify::handle_reset(state),

        // ── Graphs ───────────────────────────────────────────────────────
        (Method::Get, "/graphs") => handlers::graphs::handle_get(client),

        // ── 404 ──────────────────────────────────────────────────────────
        _ => not_found(),
    };

    if let Err(e) = request.respond(response) {
        log::warn!("failed to write response for {}: {}", path, e);
    }
}
