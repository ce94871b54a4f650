// src/services/mod.rs
pub mod openai;

#[cfg(test)]
pub mod fake;

pub use openai::OpenAiClient;

use crate::errors::StylizeError;
use crate::models::{Credential, GeneratedImage, Quality};
use async_trait::async_trait;

/// Fixed instruction sent alongside the image to the description service.
pub const DESCRIBE_INSTRUCTION: &str = "Describe what is in this image in great detail. Give as much detail as possible about any humans in the image, especially those in the foreground. Make sure to include how they are dressed and positioned.";

#[async_trait]
pub trait DescriptionService: Send + Sync {
    /// Returns a detailed text description of `image` (data URI or URL).
    async fn describe(&self, image: &str, credential: &Credential)
    -> Result<String, StylizeError>;
}

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        quality: Quality,
        credential: &Credential,
    ) -> Result<GeneratedImage, StylizeError>;
}
