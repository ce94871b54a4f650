// src/handlers.rs
use crate::{AppState, errors::StylizeError, streaming::channel, validation};
use actix_web::http::header;
use actix_web::{HttpResponse, rt, web};
use uuid::Uuid;

/// Frames buffered between the pipeline and a slow reader.
const STREAM_BUFFER: usize = 32;

pub async fn generate(
    body: web::Bytes,
    data: web::Data<AppState>,
) -> Result<HttpResponse, StylizeError> {
    let request_id = Uuid::new_v4();

    let request = validation::parse_request(&body).map_err(|e| {
        log::warn!("[{}] rejected generate request: {}", request_id, e);
        e
    })?;
    log::info!(
        "[{}] opening event stream (style '{}', quality {})",
        request_id,
        request.style,
        request.quality.as_str()
    );

    let (sink, feed) = channel::open(STREAM_BUFFER);
    let orchestrator = data.orchestrator.clone();
    rt::spawn(async move {
        orchestrator.run(request_id, request, sink).await;
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(feed))
}

pub async fn list_styles(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "styles": data.registry.styles()
    }))
}
