//! Scripted `ModelBackend` for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{
    error::{Result, StudioError},
    gemini::{
        Candidate, GenerateContentRequest, GenerateContentResponse, ModelBackend, ResponseBlob,
        ResponseContent, ResponsePart,
    },
};

#[derive(Debug, Clone)]
pub enum Step {
    Image(&'static str),
    Text(&'static str),
    Overloaded,
    NoImage,
    Terminal,
}

impl Step {
    fn into_result(self) -> Result<GenerateContentResponse> {
        let part = match self {
            Step::Image(data) => ResponsePart {
                text: None,
                inline_data: Some(ResponseBlob {
                    mime_type: Some("image/png".into()),
                    data: data.into(),
                }),
            },
            Step::Text(text) => ResponsePart {
                text: Some(text.into()),
                inline_data: None,
            },
            Step::NoImage => ResponsePart {
                text: Some("I can't draw that.".into()),
                inline_data: None,
            },
            Step::Overloaded => {
                return Err(StudioError::Api {
                    status: 503,
                    message: r#"{"error":{"code":503,"message":"The model is overloaded. Please try again later.","status":"UNAVAILABLE"}}"#.into(),
                })
            }
            Step::Terminal => {
                return Err(StudioError::Api {
                    status: 400,
                    message: "Request contains an invalid argument.".into(),
                })
            }
        };
        Ok(GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(ResponseContent { parts: vec![part] }),
                finish_reason: Some("STOP".into()),
            }],
            prompt_feedback: None,
        })
    }
}

#[derive(Default)]
pub struct ScriptedBackend {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<(String, Instant)>>,
    requests: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, model: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(model.to_string(), steps.into());
        self
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn models_called(&self) -> Vec<String> {
        self.calls().into_iter().map(|(model, _)| model).collect()
    }

    pub fn last_request(&self) -> Option<serde_json::Value> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((model.to_string(), Instant::now()));
        self.requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(|steps| steps.pop_front())
            .unwrap_or(Step::Terminal);
        step.into_result()
    }
}
