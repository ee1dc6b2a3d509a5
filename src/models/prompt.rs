use serde::{Deserialize, Serialize};

/// Which system template the prompt optimizer rewrites with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    #[default]
    Generator,
    Iteration,
    Fashion,
}

impl PromptMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptMode::Generator => "generator",
            PromptMode::Iteration => "iteration",
            PromptMode::Fashion => "fashion",
        }
    }
}
