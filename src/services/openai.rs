// src/services/openai.rs
use super::{DESCRIBE_INSTRUCTION, DescriptionService, ImageService};
use crate::config::Config;
use crate::errors::StylizeError;
use crate::models::{Credential, GeneratedImage, ImageData, Quality};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{Value, json};
use std::time::{Duration, Instant};

/// Talks to an OpenAI-compatible API: chat completions with vision for the
/// description, image generations for the render.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    vision_model: String,
    image_model: String,
    max_tokens: u32,
    describe_timeout: Duration,
    generate_timeout: Duration,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.openai_base_url.clone(),
            vision_model: config.vision_model.clone(),
            image_model: config.image_model.clone(),
            max_tokens: config.description_max_tokens,
            describe_timeout: config.describe_timeout,
            generate_timeout: config.generate_timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[async_trait]
impl DescriptionService for OpenAiClient {
    async fn describe(
        &self,
        image: &str,
        credential: &Credential,
    ) -> Result<String, StylizeError> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(credential.expose())
            .timeout(self.describe_timeout)
            .json(&json!({
                "model": self.vision_model,
                "messages": [{
                    "role": "user",
                    "content": [
                        {
                            "type": "text",
                            "text": DESCRIBE_INSTRUCTION
                        },
                        {
                            "type": "image_url",
                            "image_url": { "url": image }
                        }
                    ]
                }],
                "max_tokens": self.max_tokens
            }))
            .send()
            .await
            .map_err(|e| StylizeError::description_service(format!("request failed: {}", e)))?;

        let result = read_json(response)
            .await
            .map_err(StylizeError::description_service)?;

        let description = parse_description(&result)?;
        log::debug!(
            "description received in {}ms ({} chars)",
            start.elapsed().as_millis(),
            description.len()
        );
        Ok(description)
    }
}

#[async_trait]
impl ImageService for OpenAiClient {
    async fn generate(
        &self,
        prompt: &str,
        quality: Quality,
        credential: &Credential,
    ) -> Result<GeneratedImage, StylizeError> {
        let start = Instant::now();

        let response = self
            .client
            .post(self.url("images/generations"))
            .bearer_auth(credential.expose())
            .timeout(self.generate_timeout)
            .json(&json!({
                "model": self.image_model,
                "prompt": prompt,
                "n": 1,
                "quality": quality.as_str(),
                "response_format": "b64_json"
            }))
            .send()
            .await
            .map_err(|e| StylizeError::image_service(format!("request failed: {}", e)))?;

        let result = read_json(response)
            .await
            .map_err(StylizeError::image_service)?;

        let image = parse_generated(result)?;
        log::debug!(
            "image generated in {}ms ({} item(s))",
            start.elapsed().as_millis(),
            image.data.len()
        );
        Ok(image)
    }
}

/// Reads the body as JSON, turning non-2xx statuses into a readable message.
async fn read_json(response: Response) -> Result<Value, String> {
    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(format!("{} {}", status.as_u16(), remote_message(&error_text)));
    }

    response
        .json()
        .await
        .map_err(|e| format!("failed to parse response: {}", e))
}

fn remote_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn parse_description(result: &Value) -> Result<String, StylizeError> {
    let content = result["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .unwrap_or_default();

    if content.is_empty() {
        return Err(StylizeError::description_service("no content in response"));
    }
    Ok(content.to_string())
}

fn parse_generated(mut result: Value) -> Result<GeneratedImage, StylizeError> {
    let data: Vec<ImageData> = serde_json::from_value(result["data"].take())
        .map_err(|e| StylizeError::image_service(format!("unexpected response: {}", e)))?;

    if data.is_empty() || data.iter().any(|d| d.b64_json.is_empty()) {
        return Err(StylizeError::image_service("no image data in response"));
    }
    Ok(GeneratedImage { data })
}
