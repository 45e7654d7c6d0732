use std::path::Path;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::api::types::{ClassificationResult, HealthCheck, PlotsResponse};
use crate::api::{CLASSIFY_PATH, HEALTH_PATH, PLOTS_PATH};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::upload::ImageUpload;

/// Longest slice of an error body kept in `ClientError::Status`.
const ERROR_BODY_LIMIT: usize = 512;

/// Blocking client for the classification backend.
///
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: Client,
    config: Config,
}

impl ClassifierClient {
    pub fn new(config: Config) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(ClassifierClient { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// `POST /api/classify` with the image as the multipart field `image`.
    pub fn classify(&self, upload: &ImageUpload) -> ClientResult<ClassificationResult> {
        let url = self.config.endpoint(CLASSIFY_PATH);
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime_type())
            .map_err(|source| ClientError::Transport { url: url.clone(), source })?;
        let form = Form::new().part("image", part);

        log::debug!(
            "POST {} ({}, {} bytes)",
            url,
            upload.file_name,
            upload.bytes.len()
        );
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|source| transport_error(&url, source))?;
        decode(&url, response)
    }

    /// Reads, validates and classifies a local image file.
    pub fn classify_path(&self, path: &Path) -> ClientResult<ClassificationResult> {
        let bytes = std::fs::read(path).map_err(|source| ClientError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_owned();
        let upload = ImageUpload::from_bytes(file_name, bytes, self.config.max_upload_bytes)?;
        self.classify(&upload)
    }

    /// `GET /api/health`
    pub fn health(&self) -> ClientResult<HealthCheck> {
        self.get_json(HEALTH_PATH)
    }

    /// `GET /api/plots/all`
    pub fn plots(&self) -> ClientResult<PlotsResponse> {
        self.get_json(PLOTS_PATH)
    }

    /// Absolute URL for a plot path returned by `plots()`.
    ///
    /// Paths are served by the plot host, not the API host. Absolute URLs
    /// are returned unchanged.
    pub fn plot_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_owned();
        }
        if path.starts_with('/') {
            format!("{}{}", self.config.plots_base_url, path)
        } else {
            format!("{}/{}", self.config.plots_base_url, path)
        }
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.config.endpoint(path);
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|source| transport_error(&url, source))?;
        decode(&url, response)
    }
}

fn transport_error(url: &str, source: reqwest::Error) -> ClientError {
    log::warn!("request to {} failed: {}", url, source);
    ClientError::Transport { url: url.to_owned(), source }
}

/// Turns a response into `T`, mapping non-2xx statuses to `ClientError::Status`.
fn decode<T: DeserializeOwned>(url: &str, response: Response) -> ClientResult<T> {
    let status = response.status();
    let body = response.text().map_err(|source| transport_error(url, source))?;

    if !status.is_success() {
        log::warn!("{} returned HTTP {}", url, status.as_u16());
        return Err(ClientError::Status {
            url: url.to_owned(),
            status: status.as_u16(),
            body: truncate(&body, ERROR_BODY_LIMIT),
        });
    }

    serde_json::from_str(&body).map_err(|source| {
        log::warn!("could not decode response from {}: {}", url, source);
        ClientError::Decode { url: url.to_owned(), source }
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_owned();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ClassifierClient {
        ClassifierClient::new(Config::default()).unwrap()
    }

    #[test]
    fn plot_url_joins_paths() {
        let c = client();
        assert_eq!(c.plot_url("/plots/a.png"), "http://localhost:5001/plots/a.png");
        assert_eq!(c.plot_url("plots/a.png"), "http://localhost:5001/plots/a.png");
        assert_eq!(c.plot_url("https://cdn.example/a.png"), "https://cdn.example/a.png");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééé", 3), "é...");
    }
}
