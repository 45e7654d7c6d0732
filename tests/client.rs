use std::io::Cursor;
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use tiny_http::{Header, Response, Server};

use dermaview::{ClassifierClient, ClientError, Config, ImageUpload};

/// What the fake backend saw for one request.
struct Seen {
    method: String,
    path: String,
    content_type: String,
    body: Vec<u8>,
}

/// Starts a throwaway backend that answers every request with `reply(path)`
/// and reports each request on the returned channel.
fn spawn_backend<F>(reply: F) -> (String, mpsc::Receiver<Seen>)
where
    F: Fn(&str) -> (u16, String) + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for mut request in server.incoming_requests() {
            let mut body = Vec::new();
            request.as_reader().read_to_end(&mut body).unwrap();
            let content_type = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Content-Type"))
                .map(|h| h.value.as_str().to_owned())
                .unwrap_or_default();
            let path = request.url().to_owned();
            let (status, json) = reply(&path);
            let _ = tx.send(Seen {
                method: request.method().to_string(),
                path,
                content_type,
                body,
            });
            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response = Response::from_string(json).with_status_code(status).with_header(header);
            let _ = request.respond(response);
        }
    });

    (format!("http://{}", addr), rx)
}

fn client_for(backend_url: &str) -> ClassifierClient {
    let config = Config {
        backend_url: backend_url.to_owned(),
        plots_base_url: "http://plots.local/".to_owned(),
        request_timeout: Duration::from_secs(5),
        ..Config::default()
    }
    .validate()
    .unwrap();
    ClassifierClient::new(config).unwrap()
}

fn png_upload() -> ImageUpload {
    let img = image::DynamicImage::new_rgb8(3, 3);
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageOutputFormat::Png).unwrap();
    ImageUpload::from_bytes("lesion.png", out.into_inner(), 1 << 20).unwrap()
}

#[test]
fn classify_sends_multipart_image_and_decodes() {
    let (url, seen) = spawn_backend(|_| {
        (
            200,
            r#"{
                "result": "not_cancer",
                "result_confidence": 0.83,
                "cancer_probability": 0.17,
                "not_cancer_probability": 0.83,
                "top_class": {"index": 5, "name": "nv", "probability": 0.74},
                "all_class_probabilities": [0.02, 0.05, 0.04, 0.01, 0.1, 0.74, 0.04]
            }"#
            .to_owned(),
        )
    });
    let client = client_for(&url);
    let upload = png_upload();

    let result = client.classify(&upload).unwrap();
    assert!(!result.is_cancer());
    assert_eq!(result.top_class.as_ref().unwrap().label(), "Class 5: nv");
    let probs = result.class_probabilities();
    assert_eq!(probs.len(), 7);
    assert_eq!(probs[0].name, "Class 0");
    assert_eq!(probs[5].probability, 0.74);

    let req = seen.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/api/classify");
    assert!(req.content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&req.body);
    assert!(body.contains(r#"name="image"; filename="lesion.png""#));
    assert!(body.contains("Content-Type: image/png"));
    assert!(req.body.windows(upload.bytes.len()).any(|w| w == upload.bytes.as_slice()));
}

#[test]
fn health_and_plots() {
    let (url, seen) = spawn_backend(|path| match path {
        "/api/health" => (
            200,
            r#"{"status":"healthy","model_loaded":true,"num_classes":7,"expected_classes":7,
                "supported_classes":["akiec","bcc","bkl","df","mel","nv","vasc"],
                "cancer_classes":["akiec","bcc","mel"],
                "not_cancer_classes":["bkl","df","nv","vasc"]}"#
                .to_owned(),
        ),
        "/api/plots/all" => (
            200,
            r#"{"plots":{"training_history":"/plots/training_history.png",
                         "confusion_matrix":"/plots/confusion_matrix.png"},
                "count":2,"all_available":false}"#
                .to_owned(),
        ),
        _ => (404, "{}".to_owned()),
    });
    let client = client_for(&url);

    let health = client.health().unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.num_classes, Some(7));
    assert!(health.is_cancer_class("mel"));

    let plots = client.plots().unwrap();
    let urls: Vec<String> = plots.entries().map(|(_, p)| client.plot_url(p)).collect();
    assert_eq!(
        urls,
        vec![
            "http://plots.local/plots/training_history.png",
            "http://plots.local/plots/confusion_matrix.png",
        ]
    );

    let paths: Vec<String> = seen.try_iter().map(|s| s.path).collect();
    assert_eq!(paths, vec!["/api/health", "/api/plots/all"]);
}

#[test]
fn non_success_status_is_reported() {
    let (url, _seen) = spawn_backend(|_| (500, r#"{"error":"model not loaded"}"#.to_owned()));
    let client = client_for(&url);

    match client.health() {
        Err(ClientError::Status { status, body, .. }) => {
            assert_eq!(status, 500);
            assert!(body.contains("model not loaded"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[test]
fn malformed_json_is_a_decode_error() {
    let (url, _seen) = spawn_backend(|_| (200, "<html>oops</html>".to_owned()));
    let client = client_for(&url);
    assert!(matches!(client.plots(), Err(ClientError::Decode { .. })));
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = client_for(&format!("http://127.0.0.1:{}", port));
    assert!(matches!(client.health(), Err(ClientError::Transport { .. })));
}

#[test]
fn classify_path_rejects_missing_and_non_image_files() {
    let client = client_for("http://127.0.0.1:9");

    let missing = std::env::temp_dir().join("dermaview-no-such-file.png");
    assert!(matches!(client.classify_path(&missing), Err(ClientError::Io { .. })));

    let text = std::env::temp_dir().join(format!("dermaview-notes-{}.txt", std::process::id()));
    std::fs::write(&text, b"definitely not an image").unwrap();
    let outcome = client.classify_path(&text);
    let _ = std::fs::remove_file(&text);
    assert!(matches!(
        outcome,
        Err(ClientError::Upload(dermaview::UploadError::UnrecognizedFormat))
    ));
}
