// src/errors.rs
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StylizeError {
    #[error("{0}")]
    Validation(String),

    #[error("Unknown style: {0}")]
    UnknownStyle(String),

    #[error("{service} service error: {message}")]
    RemoteService {
        service: &'static str,
        message: String,
    },

    #[error("Composed prompt is empty: {0}")]
    EmptyPrompt(String),

    #[error("Event stream is already closed")]
    StreamClosed,

    #[error("Client disconnected from the event stream")]
    Disconnected,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StylizeError {
    pub fn description_service(message: impl Into<String>) -> Self {
        StylizeError::RemoteService {
            service: "Description",
            message: message.into(),
        }
    }

    pub fn image_service(message: impl Into<String>) -> Self {
        StylizeError::RemoteService {
            service: "Image generation",
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StylizeError {
    fn from(err: serde_json::Error) -> Self {
        StylizeError::Serialization(err.to_string())
    }
}

/// Only failures raised before the event stream opens ever reach this;
/// anything later is written onto the stream as an `error` event.
impl ResponseError for StylizeError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .content_type(ContentType::plaintext())
            .body(format!("Error: {}", self))
    }
}
