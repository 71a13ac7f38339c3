//! Label scanning: image → transcript → structured medication candidate.
//!
//! The recognizer talks to a local Ollama vision model and is swappable
//! behind the `TextRecognizer` trait; field extraction is pure regex work
//! over whatever transcript comes back.

pub mod fields;
pub mod recognizer;

use serde::Serialize;

use crate::models::CandidateRecord;

pub use recognizer::{
    detect_image_mime, MockRecognizer, OllamaVisionRecognizer, RecognitionError, TextRecognizer,
};

/// Result of one scan, handed to the confirmation form.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub candidate: CandidateRecord,
    /// Character count of the raw transcript, for the "how much did we
    /// read" hint.
    pub recognized_chars: usize,
}
