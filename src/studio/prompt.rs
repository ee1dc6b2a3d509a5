//! Single-shot prompt rewriting through a text model.

use crate::{
    error::Result,
    gemini::{Content, GenerateContentRequest, GenerationConfig, ModelBackend, Part},
    models::PromptMode,
    studio::{compose::parse_data_urls, extract::extract_text},
};

const GENERATOR_TEMPLATE: &str = "You are an expert prompt engineer for a photorealistic image generation model. \
Rewrite the user's idea into one detailed, structured image prompt. \
Describe, in this order: the main subject, its materials and colors, the setting and background, \
lighting, camera angle and lens, and overall mood. \
If reference images are attached, describe the product in them precisely so the design can be reproduced exactly. \
Never ask for text, logos or watermarks to be rendered unless the user explicitly asks. \
Answer with the prompt only, without preamble, quotes or markdown.";

const ITERATION_TEMPLATE: &str = "You are an expert prompt engineer helping a user refine an image they already generated. \
The attached image, if any, is the current result. Turn the user's feedback into a precise edit instruction: \
state exactly what must change, and explicitly state that everything else, including faces, product design and composition, \
must stay identical. Keep it short and unambiguous. \
Answer with the instruction only, without preamble, quotes or markdown.";

const FASHION_TEMPLATE: &str = "You are a fashion photography director writing prompts for an image generation model. \
Rewrite the user's request into a structured editorial brief: garment and fit, fabric and texture, model pose and expression, \
styling and accessories, location or studio setup, lighting, and camera framing. \
If reference images of garments or products are attached, require that their exact design, colors and details be preserved, \
and that any person's facial identity be preserved. Do not include any text overlays. \
Answer with the brief only, without preamble, quotes or markdown.";

pub fn system_template(mode: PromptMode) -> &'static str {
    match mode {
        PromptMode::Generator => GENERATOR_TEMPLATE,
        PromptMode::Iteration => ITERATION_TEMPLATE,
        PromptMode::Fashion => FASHION_TEMPLATE,
    }
}

pub fn build_optimize_request(
    raw_input: &str,
    mode: PromptMode,
    reference_images: &[String],
) -> Result<GenerateContentRequest> {
    let mut parts: Vec<Part> = parse_data_urls(reference_images)?
        .iter()
        .map(Part::inline)
        .collect();
    parts.push(Part::text(format!("User input: {}", raw_input.trim())));

    Ok(GenerateContentRequest {
        contents: vec![Content::user(parts)],
        system_instruction: Some(Content::system(system_template(mode))),
        generation_config: Some(GenerationConfig {
            response_modalities: vec!["TEXT".to_string()],
            image_config: None,
            temperature: Some(0.7),
        }),
    })
}

/// Rewrites `raw_input` with the mode's template. Any failure, including an
/// empty answer, yields `raw_input` unchanged.
pub async fn optimize_prompt(
    backend: &dyn ModelBackend,
    model: &str,
    raw_input: &str,
    mode: PromptMode,
    reference_images: &[String],
) -> String {
    if raw_input.trim().is_empty() && reference_images.is_empty() {
        return raw_input.to_string();
    }

    let request = match build_optimize_request(raw_input, mode, reference_images) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Prompt optimization skipped: {}", e);
            return raw_input.to_string();
        }
    };

    match backend.generate_content(model, &request).await {
        Ok(response) => match extract_text(&response) {
            Some(optimized) => {
                log::info!(
                    "Optimized {} prompt ({} -> {} chars)",
                    mode.as_str(),
                    raw_input.len(),
                    optimized.len()
                );
                optimized
            }
            None => {
                log::warn!("Prompt optimizer returned no text, keeping original input");
                raw_input.to_string()
            }
        },
        Err(e) => {
            log::warn!("Prompt optimization failed, keeping original input: {}", e);
            raw_input.to_string()
        }
    }
}
