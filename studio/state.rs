use std::sync::{Arc, Mutex};

use dermaview::{ClassificationResult, ImageUpload};

/// State of the Classify tab.
///
/// Holds the single image the user has selected and the outcome of the last
/// classification of it. Only one classification is in flight per user
/// action; the studio does not track overlapping requests.
pub struct StudioState {
    /// Image selected for classification, shown as the preview.
    pub upload:  Option<ImageUpload>,
    /// Result of the last successful classification of `upload`.
    pub result:  Option<ClassificationResult>,
    /// User-facing error from the last action, cleared by the next one.
    pub error:   Option<String>,
}

impl StudioState {
    pub fn new() -> Self {
        StudioState { upload: None, result: None, error: None }
    }

    /// Stores a newly selected image; any previous result no longer applies.
    pub fn select(&mut self, upload: ImageUpload) {
        self.upload = Some(upload);
        self.result = None;
        self.error  = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Stores the outcome of classifying `upload`. Returns `false` and leaves
    /// the state untouched when the selection changed while the call was in
    /// flight (reset or a new upload).
    pub fn record_outcome(
        &mut self,
        upload: &ImageUpload,
        outcome: Result<ClassificationResult, &str>,
    ) -> bool {
        if self.upload.as_ref() != Some(upload) {
            return false;
        }
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error  = None;
            }
            Err(message) => {
                self.result = None;
                self.fail(message);
            }
        }
        true
    }

    pub fn reset(&mut self) {
        self.upload = None;
        self.result = None;
        self.error  = None;
    }

    /// The "Upload New Image" button is offered once there is anything to clear.
    pub fn can_reset(&self) -> bool {
        self.upload.is_some() || self.result.is_some()
    }
}

/// Shared state type — an `Arc<Mutex<StudioState>>` passed to every handler.
pub type SharedState = Arc<Mutex<StudioState>>;

/// Locks the shared state, recovering the guard if a handler thread panicked
/// while holding it.
pub fn lock(state: &SharedState) -> std::sync::MutexGuard<'_, StudioState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
