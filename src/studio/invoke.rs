use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::GeminiConfig,
    error::{Result, StudioError},
    gemini::{GenerateContentRequest, ModelBackend},
    models::GeneratedImage,
    studio::{
        classify::{classify, InvocationOutcome},
        extract::extract_image,
    },
};

pub const EXHAUSTED_MESSAGE: &str =
    "Generation failed: all models are overloaded or unavailable. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    identifier: String,
    max_attempts: u32,
}

impl ModelCandidate {
    /// `max_attempts` is clamped to at least one.
    pub fn new(identifier: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            identifier: identifier.into(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

/// How terminal (non-retryable) failures are treated per candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscalationPolicy {
    /// A terminal failure of the first candidate aborts the whole call; later
    /// candidates' terminal failures only skip to the next candidate.
    #[default]
    Primary,
    /// Every candidate's terminal failure skips to the next candidate.
    Never,
}

/// Tries candidates strictly in order, each with its own retry budget.
pub struct ModelInvoker {
    backend: Arc<dyn ModelBackend>,
    candidates: Vec<ModelCandidate>,
    backoff_unit: Duration,
    escalation: EscalationPolicy,
}

impl ModelInvoker {
    pub fn new(backend: Arc<dyn ModelBackend>, candidates: Vec<ModelCandidate>) -> Self {
        Self {
            backend,
            candidates,
            backoff_unit: Duration::from_millis(3000),
            escalation: EscalationPolicy::default(),
        }
    }

    /// Primary then secondary image model from config.
    pub fn from_config(backend: Arc<dyn ModelBackend>, config: &GeminiConfig) -> Self {
        let candidates = vec![
            ModelCandidate::new(&config.primary_model, config.max_attempts),
            ModelCandidate::new(&config.secondary_model, config.max_attempts),
        ];
        Self::new(backend, candidates).with_backoff_unit(config.backoff_unit)
    }

    pub fn with_backoff_unit(mut self, backoff_unit: Duration) -> Self {
        self.backoff_unit = backoff_unit;
        self
    }

    pub fn with_escalation(mut self, escalation: EscalationPolicy) -> Self {
        self.escalation = escalation;
        self
    }

    pub fn candidates(&self) -> &[ModelCandidate] {
        &self.candidates
    }

    pub async fn invoke(&self, request: &GenerateContentRequest) -> Result<GeneratedImage> {
        let mut attempts = 0u32;

        for (index, candidate) in self.candidates.iter().enumerate() {
            let model = candidate.identifier.as_str();

            for attempt in 1..=candidate.max_attempts {
                attempts += 1;
                log::info!(
                    "Generating with {} (attempt {}/{})",
                    model,
                    attempt,
                    candidate.max_attempts
                );

                let result = self
                    .backend
                    .generate_content(model, request)
                    .await
                    .and_then(|response| extract_image(&response));

                match classify(result) {
                    InvocationOutcome::Success(data_url) => {
                        log::info!("Image generated by {} after {} attempt(s)", model, attempts);
                        return Ok(GeneratedImage {
                            data_url,
                            model: model.to_string(),
                            attempts,
                        });
                    }
                    InvocationOutcome::TransientFailure(err) => {
                        log::warn!(
                            "{} attempt {}/{} failed transiently: {}",
                            model,
                            attempt,
                            candidate.max_attempts,
                            err
                        );
                        if attempt < candidate.max_attempts {
                            let delay = self.backoff_unit * attempt;
                            log::debug!("Retrying {} in {}ms", model, delay.as_millis());
                            tokio::time::sleep(delay).await;
                        }
                    }
                    InvocationOutcome::TerminalFailure(err) => {
                        if index == 0 && self.escalation == EscalationPolicy::Primary {
                            log::error!("{} failed with a terminal error: {}", model, err);
                            return Err(err);
                        }
                        log::warn!("{} is unusable, trying next model: {}", model, err);
                        break;
                    }
                }
            }
        }

        log::error!(
            "All {} model candidates exhausted after {} attempt(s)",
            self.candidates.len(),
            attempts
        );
        Err(StudioError::TerminalGenerationFailure(
            EXHAUSTED_MESSAGE.to_string(),
        ))
    }
}
