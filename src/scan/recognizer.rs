use base64::Engine as _;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Ollama is not running at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Recognition engine returned error (status {status}): {body}")]
    Engine { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Unsupported or unreadable image data")]
    UnreadableImage,
}

/// Turns a label photo into a plain-text transcript.
///
/// Implementations run blocking I/O; callers move them off the async
/// runtime with `spawn_blocking`.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, RecognitionError>;
}

/// Sniff the image format from magic bytes.
///
/// Returns `None` for anything that is not a JPEG, PNG, WebP or TIFF,
/// which is how obviously-not-an-image uploads get rejected before any
/// model time is spent on them.
pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some("image/png");
    }
    if bytes.starts_with(b"RIFF") && bytes.len() >= 12 && &bytes[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00]) || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
    {
        return Some("image/tiff");
    }
    None
}

/// Instruction sent alongside the label photo. Kept terse; chatty prompts
/// make vision models editorialize instead of transcribe.
const LABEL_PROMPT: &str = "\
You are reading a prescription medication label. Transcribe every line of \
visible text exactly as printed, one line per output line. \
Output plain text only, with no commentary.";

/// Request body for Ollama `/api/chat`.
///
/// Vision models with chat templates (LLaVA, MedGemma, Gemma) reject
/// images on `/api/generate`, so the chat endpoint is the only option.
#[derive(Debug, Serialize)]
struct VisionChatRequest<'a> {
    model: &'a str,
    messages: Vec<VisionChatMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct VisionChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    /// Base64-encoded images (only on user messages).
    #[serde(skip_serializing_if = "Option::is_none")]
    images: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct VisionChatResponse {
    message: VisionChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct VisionChatResponseMessage {
    content: String,
}

/// Production recognizer backed by a local Ollama vision model.
pub struct OllamaVisionRecognizer {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaVisionRecognizer {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Default local Ollama instance with the configured vision model.
    pub fn default_local() -> Self {
        Self::new(
            config::OLLAMA_BASE_URL,
            config::VISION_MODEL,
            config::OLLAMA_TIMEOUT_SECS,
        )
    }
}

impl TextRecognizer for OllamaVisionRecognizer {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, RecognitionError> {
        if detect_image_mime(image_bytes).is_none() {
            return Err(RecognitionError::UnreadableImage);
        }

        let encoded = base64::engine::general_purpose::STANDARD.encode(image_bytes);
        let url = format!("{}/api/chat", self.base_url);
        let body = VisionChatRequest {
            model: &self.model,
            messages: vec![VisionChatMessage {
                role: "user",
                content: LABEL_PROMPT,
                images: Some(vec![encoded]),
            }],
            stream: false,
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                RecognitionError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                RecognitionError::HttpClient(format!(
                    "Request timed out after {}s",
                    self.timeout_secs
                ))
            } else {
                RecognitionError::HttpClient(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(RecognitionError::Engine {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: VisionChatResponse = response
            .json()
            .map_err(|e| RecognitionError::ResponseParsing(e.to_string()))?;

        Ok(parsed.message.content)
    }
}

/// Test recognizer returning a configurable transcript or failure.
pub struct MockRecognizer {
    text: String,
    fail: bool,
}

impl MockRecognizer {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fail: false,
        }
    }

    /// A recognizer whose every call fails as if the engine were down.
    pub fn failing() -> Self {
        Self {
            text: String::new(),
            fail: true,
        }
    }
}

impl TextRecognizer for MockRecognizer {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, RecognitionError> {
        if detect_image_mime(image_bytes).is_none() {
            return Err(RecognitionError::UnreadableImage);
        }
        if self.fail {
            return Err(RecognitionError::Connection(
                config::OLLAMA_BASE_URL.to_string(),
            ));
        }
        Ok(self.text.clone())
    }
}
