//! The image-generation pipeline: compose, invoke with fallback, extract.

pub mod classify;
pub mod compose;
pub mod extract;
pub mod invoke;
pub mod prompt;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use crate::{
    config::GeminiConfig,
    error::Result,
    gemini::{GeminiClient, ModelBackend},
    logger,
    models::{AspectRatio, GeneratedImage, GenerationRequest, PromptMode, Workflow},
};

pub use classify::{classify, is_transient, is_transient_message, InvocationOutcome};
pub use compose::{build_image_request, compose, parse_data_url, parse_data_urls};
pub use extract::{extract_image, extract_text};
pub use invoke::{EscalationPolicy, ModelCandidate, ModelInvoker, EXHAUSTED_MESSAGE};

pub struct Studio {
    backend: Arc<dyn ModelBackend>,
    invoker: ModelInvoker,
    text_model: String,
}

impl Studio {
    /// Builds a studio backed by the Gemini REST API.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = GeminiClient::new(config)?;
        Ok(Self::with_backend(Arc::new(client), config))
    }

    pub fn with_backend(backend: Arc<dyn ModelBackend>, config: &GeminiConfig) -> Self {
        Self {
            invoker: ModelInvoker::from_config(backend.clone(), config),
            backend,
            text_model: config.text_model.clone(),
        }
    }

    pub fn with_escalation(mut self, escalation: EscalationPolicy) -> Self {
        self.invoker = self.invoker.with_escalation(escalation);
        self
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage> {
        let _timer = logger::timer(&format!("{:?} image", request.workflow));
        let body = build_image_request(request)?;
        self.invoker.invoke(&body).await
    }

    /// Text-to-image with optional reference images given as data URLs.
    pub async fn generate_image(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        reference_images: &[String],
    ) -> Result<String> {
        let request = GenerationRequest::new(prompt)
            .with_reference_images(parse_data_urls(reference_images)?)
            .with_aspect_ratio(aspect_ratio);
        Ok(self.generate(&request).await?.data_url)
    }

    pub async fn edit_image(
        &self,
        image: &str,
        instruction: &str,
        aspect_ratio: AspectRatio,
    ) -> Result<String> {
        let request = GenerationRequest::new(instruction)
            .with_reference_images(vec![parse_data_url(image)?])
            .with_aspect_ratio(aspect_ratio)
            .with_workflow(Workflow::Edit);
        Ok(self.generate(&request).await?.data_url)
    }

    /// Re-renders `image` for another aspect ratio.
    pub async fn format_image(&self, image: &str, aspect_ratio: AspectRatio) -> Result<String> {
        let request = GenerationRequest::new(format!(
            "Adapt this image to a {} aspect ratio.",
            aspect_ratio.as_str()
        ))
        .with_reference_images(vec![parse_data_url(image)?])
        .with_aspect_ratio(aspect_ratio)
        .with_workflow(Workflow::Format);
        Ok(self.generate(&request).await?.data_url)
    }

    pub async fn optimize_prompt(
        &self,
        raw_input: &str,
        mode: PromptMode,
        reference_images: &[String],
    ) -> String {
        prompt::optimize_prompt(
            self.backend.as_ref(),
            &self.text_model,
            raw_input,
            mode,
            reference_images,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StudioError;
    use super::testing::{ScriptedBackend, Step};

    fn config() -> GeminiConfig {
        GeminiConfig::new().with_models("primary", "secondary")
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_image_returns_data_url() {
        let backend = Arc::new(ScriptedBackend::new().script("primary", vec![Step::Image("AQID")]));
        let studio = Studio::with_backend(backend.clone(), &config());

        let url = studio
            .generate_image(
                "a red boxing glove on white background",
                AspectRatio::Landscape,
                &["data:image/webp;base64,UklGRg==".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(url, "data:image/png;base64,AQID");
        let sent = backend.last_request().unwrap();
        let parts = sent["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/webp");
        assert_eq!(
            sent["generationConfig"]["imageConfig"]["aspectRatio"],
            "16:9"
        );
    }

    #[tokio::test]
    async fn test_malformed_reference_fails_before_any_call() {
        let backend = Arc::new(ScriptedBackend::new());
        let studio = Studio::with_backend(backend.clone(), &config());

        let err = studio
            .generate_image("x", AspectRatio::Square, &["data:image/png;base64,%%".into()])
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::MalformedImageData(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_and_format_use_their_reinforcement() {
        let backend = Arc::new(
            ScriptedBackend::new().script("primary", vec![Step::Image("AQID"), Step::Image("BAUG")]),
        );
        let studio = Studio::with_backend(backend.clone(), &config());

        studio
            .edit_image("AQID", "remove the hat", AspectRatio::Portrait)
            .await
            .unwrap();
        let sent = backend.last_request().unwrap();
        let text = sent["contents"][0]["parts"][1]["text"].as_str().unwrap();
        assert!(text.starts_with("remove the hat"));
        assert!(text.contains("facial identity"));

        let url = studio.format_image("AQID", AspectRatio::Portrait).await.unwrap();
        assert_eq!(url, "data:image/png;base64,BAUG");
        let sent = backend.last_request().unwrap();
        let text = sent["contents"][0]["parts"][1]["text"].as_str().unwrap();
        assert!(text.starts_with("Adapt this image to a 9:16 aspect ratio."));
    }

    #[tokio::test]
    async fn test_optimize_prompt_uses_text_model() {
        let backend = Arc::new(
            ScriptedBackend::new().script("gemini-2.5-flash", vec![Step::Text("better prompt")]),
        );
        let studio = Studio::with_backend(backend.clone(), &config());

        let result = studio
            .optimize_prompt("prompt", PromptMode::Generator, &[])
            .await;
        assert_eq!(result, "better prompt");
        assert_eq!(backend.models_called(), vec!["gemini-2.5-flash"]);
    }

    #[test]
    fn test_new_without_api_key_is_configuration_error() {
        assert!(matches!(
            Studio::new(&GeminiConfig::new()),
            Err(StudioError::Configuration(_))
        ));
    }
}
