// src/services/fake.rs
//! In-process collaborators for tests. Each counts its calls.
use super::{DescriptionService, ImageService};
use crate::errors::StylizeError;
use crate::models::{Credential, GeneratedImage, ImageData, Quality};
use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub struct FakeDescriber {
    reply: Result<String, String>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeDescriber {
    pub fn replying(description: &str) -> Self {
        Self {
            reply: Ok(description.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DescriptionService for FakeDescriber {
    async fn describe(
        &self,
        _image: &str,
        _credential: &Credential,
    ) -> Result<String, StylizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.reply.clone().map_err(StylizeError::description_service)
    }
}

pub struct FakeImager {
    fail_with: Option<String>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<(String, Quality)>>,
}

impl FakeImager {
    pub fn succeeding() -> Self {
        Self {
            fail_with: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::succeeding()
        }
    }

    pub fn artifact() -> GeneratedImage {
        GeneratedImage {
            data: vec![ImageData {
                b64_json: "iVBORw0KGgo=".to_string(),
                revised_prompt: None,
            }],
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<(String, Quality)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageService for FakeImager {
    async fn generate(
        &self,
        prompt: &str,
        quality: Quality,
        _credential: &Credential,
    ) -> Result<GeneratedImage, StylizeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), quality));

        match &self.fail_with {
            Some(message) => Err(StylizeError::image_service(message.clone())),
            None => Ok(Self::artifact()),
        }
    }
}

/// Splits a raw event stream body into `(kind, json payload)` pairs.
pub fn parse_frames(body: &str) -> Vec<(String, serde_json::Value)> {
    body.split("\n\n")
        .filter(|frame| !frame.is_empty())
        .map(|frame| {
            let mut lines = frame.lines();
            let kind = lines
                .next()
                .and_then(|l| l.strip_prefix("event: "))
                .expect("event line")
                .to_string();
            let data = lines
                .next()
                .and_then(|l| l.strip_prefix("data: "))
                .expect("data line");
            (kind, serde_json::from_str(data).expect("json payload"))
        })
        .collect()
}
