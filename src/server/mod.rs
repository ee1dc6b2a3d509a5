//! HTTP endpoints. Every route is POST-only and answers `{"result": ...}` on
//! success or `{"error": "..."}` with status 500 on failure.

pub mod handlers;

use std::sync::Arc;

use actix_web::{
    error::InternalError, http::StatusCode, web, App, HttpResponse, HttpServer, ResponseError,
};
use serde::Serialize;

use crate::{
    config::Config,
    error::{Result, StudioError},
    logger,
    studio::Studio,
    usage::{self, UsageStore},
};

const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Shared per-process state. `studio` is `None` when no API key is configured,
/// so the server still starts and reports the problem per request.
pub struct AppState {
    pub studio: Option<Arc<Studio>>,
    pub usage: Arc<dyn UsageStore>,
}

impl AppState {
    pub fn new(studio: Option<Arc<Studio>>, usage: Arc<dyn UsageStore>) -> Self {
        Self { studio, usage }
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        let studio = match Studio::new(&config.gemini) {
            Ok(studio) => Some(Arc::new(studio)),
            Err(e) => {
                log::error!("Image generation disabled: {}", e);
                None
            }
        };
        let usage = usage::from_config(config).await?;
        Ok(Self::new(studio, usage))
    }

    pub fn studio(&self) -> Result<&Studio> {
        self.studio
            .as_deref()
            .ok_or_else(|| StudioError::Configuration("API key not configured".into()))
    }
}

#[derive(Debug, Serialize)]
pub struct ResultBody<T> {
    pub result: T,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl ResponseError for StudioError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            StudioError::Configuration(message) => message.clone(),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody::new(message))
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    let json_config = web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| {
            let response =
                HttpResponse::InternalServerError().json(ErrorBody::new(err.to_string()));
            InternalError::from_response(err, response).into()
        });

    cfg.app_data(json_config)
        .service(post_only("/api/generate", handlers::generate))
        .service(post_only("/api/edit", handlers::edit))
        .service(post_only("/api/format", handlers::format))
        .service(post_only("/api/optimize-prompt", handlers::optimize_prompt))
        .service(post_only("/api/usage/stats", handlers::usage_stats));
}

fn post_only<F, Args>(path: &str, handler: F) -> actix_web::Resource
where
    F: actix_web::Handler<Args>,
    Args: actix_web::FromRequest + 'static,
    F::Output: actix_web::Responder + 'static,
{
    web::resource(path)
        .route(web::post().to(handler))
        .default_service(web::route().to(handlers::method_not_allowed))
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let state = AppState::from_config(&config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(state);

    let port = config.port.unwrap_or(8080);
    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        &config.host,
        port,
    );

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind((config.host.as_str(), port))?
        .run()
        .await
}
