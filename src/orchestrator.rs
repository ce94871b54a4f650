// src/orchestrator.rs
use crate::config::Config;
use crate::errors::StylizeError;
use crate::models::{GeneratedImage, GenerationRequest, ProgressEvent};
use crate::services::{DescriptionService, ImageService};
use crate::streaming::{EventSink, Heartbeat};
use crate::styles::StyleRegistry;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

pub const STARTING_MESSAGE: &str = "Generating image...";

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub heartbeat_interval: Duration,
    pub emit_prompt_event: bool,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            heartbeat_interval: config.heartbeat_interval,
            emit_prompt_event: config.emit_prompt_event,
        }
    }
}

struct Rendered {
    prompt: String,
    image: GeneratedImage,
}

/// Runs describe → compose → generate for one request and owns the outbound
/// stream for its whole lifetime.
pub struct Orchestrator {
    describer: Arc<dyn DescriptionService>,
    imager: Arc<dyn ImageService>,
    registry: Arc<StyleRegistry>,
    settings: PipelineSettings,
}

impl Orchestrator {
    pub fn new(
        describer: Arc<dyn DescriptionService>,
        imager: Arc<dyn ImageService>,
        registry: Arc<StyleRegistry>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            describer,
            imager,
            registry,
            settings,
        }
    }

    /// Always leaves `sink` closed. Unless the client went away, the last
    /// event written is exactly one `image` or `error`.
    pub async fn run(&self, request_id: Uuid, request: GenerationRequest, sink: EventSink) {
        let start = Instant::now();

        if let Err(e) = sink.write(&ProgressEvent::message(STARTING_MESSAGE)).await {
            log::warn!("[{}] could not start stream: {}", request_id, e);
            sink.close().await;
            return;
        }

        let heartbeat = Heartbeat::start(sink.clone(), self.settings.heartbeat_interval);

        let outcome = tokio::select! {
            result = self.render(request_id, &request) => Some(result),
            _ = sink.disconnected() => None,
        };

        // No heartbeat may land after this point.
        let beats = heartbeat.stop().await;

        let Some(outcome) = outcome else {
            log::warn!(
                "[{}] client disconnected after {}ms, pipeline abandoned",
                request_id,
                start.elapsed().as_millis()
            );
            sink.close().await;
            return;
        };

        let terminal = match outcome {
            Ok(rendered) => {
                if self.settings.emit_prompt_event {
                    if let Err(e) = sink.write(&ProgressEvent::Prompt(rendered.prompt)).await {
                        log::warn!("[{}] prompt event not delivered: {}", request_id, e);
                    }
                }
                log::info!(
                    "[{}] image ready in {}ms ({} heartbeats)",
                    request_id,
                    start.elapsed().as_millis(),
                    beats
                );
                ProgressEvent::Image(rendered.image)
            }
            Err(e) => {
                log::error!(
                    "[{}] generation failed after {}ms: {}",
                    request_id,
                    start.elapsed().as_millis(),
                    e
                );
                ProgressEvent::Error(e.to_string())
            }
        };

        debug_assert!(terminal.is_terminal());
        if let Err(e) = sink.write(&terminal).await {
            log::warn!(
                "[{}] terminal '{}' event not delivered: {}",
                request_id,
                terminal.kind(),
                e
            );
        }
        sink.close().await;
    }

    async fn render(
        &self,
        request_id: Uuid,
        request: &GenerationRequest,
    ) -> Result<Rendered, StylizeError> {
        log::info!("[{}] describing image for style '{}'", request_id, request.style);
        let description = self
            .describer
            .describe(&request.image_data, &request.credential)
            .await?;

        let fragment = self.registry.lookup(&request.style)?;
        let prompt = compose_prompt(request.system_prompt.as_deref(), &description, fragment)?;
        log::debug!("[{}] composed prompt: {}", request_id, prompt);

        log::info!(
            "[{}] generating {} quality image",
            request_id,
            request.quality.as_str()
        );
        let image = self
            .imager
            .generate(&prompt, request.quality, &request.credential)
            .await?;

        Ok(Rendered { prompt, image })
    }
}

/// System prefix, base description, style fragment, in that order.
pub fn compose_prompt(
    system_prompt: Option<&str>,
    description: &str,
    fragment: &str,
) -> Result<String, StylizeError> {
    let description = description.trim();
    if description.is_empty() {
        return Err(StylizeError::EmptyPrompt(
            "the image description was empty".to_string(),
        ));
    }

    let prompt = [system_prompt.unwrap_or_default(), description, fragment]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if prompt.is_empty() {
        return Err(StylizeError::EmptyPrompt("nothing to send".to_string()));
    }
    Ok(prompt)
}
