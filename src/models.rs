// src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fields of the `POST /api/generate` body (`image`, `key`, `style`,
/// `systemPrompt`, `isHD`) before required ones are checked.
#[derive(Debug, Default)]
pub struct GenerateBody {
    pub image: Option<String>,
    pub key: Option<String>,
    pub style: Option<String>,
    pub system_prompt: Option<String>,
    pub is_hd: Option<bool>,
}

/// Caller-supplied API key. Never printed.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Standard,
    Hd,
}

impl Quality {
    pub fn from_hd_flag(high_definition: bool) -> Self {
        if high_definition {
            Quality::Hd
        } else {
            Quality::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Standard => "standard",
            Quality::Hd => "hd",
        }
    }
}

/// A validated generation request. Immutable once built.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub image_data: String,
    pub credential: Credential,
    pub style: String,
    pub system_prompt: Option<String>,
    pub quality: Quality,
}

/// One entry of the image service's `data` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    pub b64_json: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedImage {
    pub data: Vec<ImageData>,
}

/// Progress events as they appear on the wire:
/// `{"type": "<kind>", "data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum ProgressEvent {
    Message(String),
    Prompt(String),
    Image(GeneratedImage),
    Error(String),
}

impl ProgressEvent {
    pub fn message(text: impl Into<String>) -> Self {
        ProgressEvent::Message(text.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProgressEvent::Message(_) => "message",
            ProgressEvent::Prompt(_) => "prompt",
            ProgressEvent::Image(_) => "image",
            ProgressEvent::Error(_) => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Image(_) | ProgressEvent::Error(_))
    }
}
