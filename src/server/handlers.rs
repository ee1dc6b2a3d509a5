use actix_web::{web, HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::Result,
    models::{
        AspectRatio, GenerationRequest, PromptMode, Resolution, Section, UsageEvent, UsageStats,
    },
    server::{AppState, ErrorBody, ResultBody},
    studio::parse_data_urls,
};

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateBody {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    #[serde(default)]
    pub reference_images: Vec<String>,
    #[serde(default)]
    pub resolution: Resolution,
    /// Set by the fashion view so its usage is counted separately.
    #[serde(default)]
    pub section: Option<Section>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBody {
    pub image: String,
    pub prompt: String,
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatBody {
    pub image: String,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeBody {
    pub input: String,
    #[serde(default)]
    pub mode: PromptMode,
    #[serde(default)]
    pub reference_images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatsBody {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

pub async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed().json(ErrorBody::new("Method not allowed"))
}

/// Appends a usage event when the caller identified itself. Failures are
/// logged and never affect the response.
async fn record_usage(state: &AppState, req: &HttpRequest, section: Section) {
    let user_id = match req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        Some(user_id) => user_id,
        None => return,
    };

    if let Err(e) = state.usage.record(UsageEvent::now(user_id, section)).await {
        log::warn!("Failed to record usage for {}: {}", user_id, e);
    }
}

pub async fn generate(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<GenerateBody>,
) -> Result<web::Json<ResultBody<String>>> {
    let studio = state.studio()?;
    let body = body.into_inner();

    let request = GenerationRequest::new(body.prompt)
        .with_reference_images(parse_data_urls(&body.reference_images)?)
        .with_aspect_ratio(body.aspect_ratio)
        .with_resolution(body.resolution);
    let image = studio.generate(&request).await?;

    record_usage(&state, &req, body.section.unwrap_or(Section::Generator)).await;
    Ok(web::Json(ResultBody {
        result: image.data_url,
    }))
}

pub async fn edit(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<EditBody>,
) -> Result<web::Json<ResultBody<String>>> {
    let studio = state.studio()?;
    let result = studio
        .edit_image(&body.image, &body.prompt, body.aspect_ratio)
        .await?;

    record_usage(&state, &req, Section::Editor).await;
    Ok(web::Json(ResultBody { result }))
}

pub async fn format(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<FormatBody>,
) -> Result<web::Json<ResultBody<String>>> {
    let studio = state.studio()?;
    let result = studio.format_image(&body.image, body.aspect_ratio).await?;

    record_usage(&state, &req, Section::Format).await;
    Ok(web::Json(ResultBody { result }))
}

pub async fn optimize_prompt(
    state: web::Data<AppState>,
    body: web::Json<OptimizeBody>,
) -> Result<web::Json<ResultBody<String>>> {
    let studio = state.studio()?;
    let result = studio
        .optimize_prompt(&body.input, body.mode, &body.reference_images)
        .await;
    Ok(web::Json(ResultBody { result }))
}

pub async fn usage_stats(
    state: web::Data<AppState>,
    body: web::Json<StatsBody>,
) -> Result<web::Json<ResultBody<UsageStats>>> {
    let result = state.usage.stats(body.from, body.to).await?;
    Ok(web::Json(ResultBody { result }))
}
