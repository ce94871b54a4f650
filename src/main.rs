// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use anyhow::Context;
use log::info;
use std::sync::Arc;

mod config;
mod errors;
mod handlers;
mod models;
mod orchestrator;
mod services;
mod streaming;
mod styles;
mod validation;

use crate::config::Config;
use crate::handlers::{generate, list_styles};
use crate::orchestrator::{Orchestrator, PipelineSettings};
use crate::services::OpenAiClient;
use crate::styles::StyleRegistry;

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<Orchestrator>,
    registry: Arc<StyleRegistry>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Stylize service...");

    let config = Config::from_env().context("failed to load configuration")?;
    let registry = Arc::new(StyleRegistry::builtin().context("style table is incomplete")?);
    info!("Loaded {} styles", registry.styles().len());

    // One client serves both remote collaborators; the caller's key is sent per request.
    let openai = Arc::new(OpenAiClient::new(&config));
    let orchestrator = Arc::new(Orchestrator::new(
        openai.clone(),
        openai,
        registry.clone(),
        PipelineSettings::from_config(&config),
    ));

    let app_state = AppState {
        orchestrator,
        registry,
    };
    let max_body_bytes = config.max_body_bytes;

    info!(
        "Starting HTTP server on {} (heartbeat every {:?})",
        config.bind_addr, config.heartbeat_interval
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::PayloadConfig::new(max_body_bytes))
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api")
                    .route("/generate", web::post().to(generate))
                    .route("/styles", web::get().to(list_styles)),
            )
            .route("/health", web::get().to(health_check))
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "stylize",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
